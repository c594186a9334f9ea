//! `INCLUDES { ... }` block parsing.
//!
//! An entry file may pull other facet files of the same feature into its
//! graph with a single block:
//!
//! ```text
//! INCLUDES {
//!   schema: "weather.schema.intent"
//!   flow:   "weather.flow.intent"
//! }
//! ```
//!
//! This module only parses the block; resolving the paths against the
//! filesystem happens in `ops::validate`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::facet::Facet;

/// Block keyword.
pub const INCLUDES_KEYWORD: &str = "INCLUDES";

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*"([^"]*)"$"#).expect("valid includes entry regex")
});

/// One `<facet>: "<path>"` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeEntry {
    pub facet: Facet,
    pub path: String,
    /// 1-based line number in the entry file
    pub line: usize,
}

/// Why an includes block could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncludesError {
    #[error("line {line}: only one INCLUDES block is allowed")]
    MultipleBlocks { line: usize },

    #[error("line {line}: malformed INCLUDES declaration, expected `INCLUDES {{`")]
    MalformedDeclaration { line: usize },

    #[error("line {line}: malformed INCLUDES entry '{text}', {reason}")]
    MalformedEntry {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("line {line}: duplicate INCLUDES key '{facet}'")]
    DuplicateKey { line: usize, facet: Facet },

    #[error("line {line}: INCLUDES block is never closed")]
    Unterminated { line: usize },

    #[error("line {line}: INCLUDES block declares no entries")]
    EmptyBlock { line: usize },
}

/// Parse the (at most one) includes block of an entry file.
///
/// Returns an empty list when the file has no block.
pub fn parse_includes(content: &str) -> Result<Vec<IncludeEntry>, IncludesError> {
    let mut entries: Vec<IncludeEntry> = Vec::new();
    let mut open_line: Option<usize> = None;
    let mut seen_block = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.starts_with(INCLUDES_KEYWORD) {
            if seen_block {
                return Err(IncludesError::MultipleBlocks { line: line_no });
            }
            if !is_block_open(line) {
                return Err(IncludesError::MalformedDeclaration { line: line_no });
            }
            seen_block = true;
            open_line = Some(line_no);
            continue;
        }

        let Some(start) = open_line else {
            continue;
        };

        if line.is_empty() {
            continue;
        }

        if line == "}" {
            if entries.is_empty() {
                return Err(IncludesError::EmptyBlock { line: start });
            }
            open_line = None;
            continue;
        }

        let entry = parse_entry(line, line_no)?;
        if entries.iter().any(|e| e.facet == entry.facet) {
            return Err(IncludesError::DuplicateKey {
                line: line_no,
                facet: entry.facet,
            });
        }
        entries.push(entry);
    }

    if let Some(start) = open_line {
        return Err(IncludesError::Unterminated { line: start });
    }

    Ok(entries)
}

fn is_block_open(line: &str) -> bool {
    line.strip_prefix(INCLUDES_KEYWORD)
        .map(|rest| rest.trim_start() == "{")
        .unwrap_or(false)
}

fn parse_entry(line: &str, line_no: usize) -> Result<IncludeEntry, IncludesError> {
    let malformed = |reason: &str| IncludesError::MalformedEntry {
        line: line_no,
        text: line.to_string(),
        reason: reason.to_string(),
    };

    let captures = ENTRY_RE
        .captures(line)
        .ok_or_else(|| malformed("expected `<facet>: \"<path>\"`"))?;

    let key = &captures[1];
    let facet = Facet::from_keyword(key)
        .ok_or_else(|| malformed(&format!("unknown facet '{}'", key)))?;

    let path = captures[2].to_string();
    if path.is_empty() {
        return Err(malformed("path is empty"));
    }

    Ok(IncludeEntry {
        facet,
        path,
        line: line_no,
    })
}
