//! Source header parsing.
//!
//! Line 1 of every source file declares its identity:
//!
//! ```text
//! AIM: weather#schema@1.0
//! ```
//!
//! The older metadata block format (`:::AIL_METADATA` with `FEATURE:` /
//! `FACET:` / `VERSION:` lines) is rejected anywhere in the file. That scan
//! runs before the header is looked at, so a file carrying both a legacy
//! token and a broken header reports the legacy token.

use serde::Serialize;
use thiserror::Error;

use crate::core::facet::{Facet, FeatureName, Version};

/// Header keyword, including the colon.
pub const HEADER_PREFIX: &str = "AIM:";

/// Deprecated metadata markers, in the order they are reported.
pub const LEGACY_TOKENS: [&str; 4] = [":::AIL_METADATA", "FEATURE:", "FACET:", "VERSION:"];

/// A parsed line-1 header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub feature: FeatureName,
    pub facet: Facet,
    pub version: Version,
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}@{}", self.feature, self.facet, self.version)
    }
}

/// Why a header could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("legacy metadata token '{0}' is not allowed")]
    LegacyToken(&'static str),

    #[error("first line must match AIM header grammar ({reason})")]
    Grammar { reason: String },
}

impl HeaderError {
    fn grammar(reason: impl Into<String>) -> Self {
        HeaderError::Grammar {
            reason: reason.into(),
        }
    }
}

/// Find the first legacy token present anywhere in `content`.
pub fn find_legacy_token(content: &str) -> Option<&'static str> {
    LEGACY_TOKENS
        .iter()
        .copied()
        .find(|token| content.contains(token))
}

/// Parse the header of a source file.
pub fn parse_header(content: &str) -> Result<Header, HeaderError> {
    if let Some(token) = find_legacy_token(content) {
        return Err(HeaderError::LegacyToken(token));
    }

    let first_line = content.lines().next().unwrap_or("").trim();
    parse_header_line(first_line)
}

/// Parse a single (already trimmed) header line.
pub fn parse_header_line(line: &str) -> Result<Header, HeaderError> {
    if line.is_empty() {
        return Err(HeaderError::grammar("file is empty"));
    }

    let rest = line.strip_prefix(HEADER_PREFIX).ok_or_else(|| {
        HeaderError::grammar(format!("expected `{} <feature>#<facet>@<version>`", HEADER_PREFIX))
    })?;

    // At least one whitespace character separates the keyword from the identity.
    let identity = rest.trim_start();
    if identity.len() == rest.len() {
        return Err(HeaderError::grammar(format!(
            "expected whitespace after `{}`",
            HEADER_PREFIX
        )));
    }

    let (feature, rest) = identity
        .split_once('#')
        .ok_or_else(|| HeaderError::grammar("missing `#` between feature and facet"))?;
    let (facet, version) = rest
        .split_once('@')
        .ok_or_else(|| HeaderError::grammar("missing `@` between facet and version"))?;

    let feature = FeatureName::parse(feature)
        .map_err(|_| HeaderError::grammar(format!("invalid feature '{}'", feature)))?;
    let facet = Facet::from_keyword(facet)
        .ok_or_else(|| HeaderError::grammar(format!("unknown facet '{}'", facet)))?;
    let version = Version::parse(version)
        .map_err(|_| HeaderError::grammar(format!("invalid version '{}'", version)))?;

    Ok(Header {
        feature,
        facet,
        version,
    })
}
