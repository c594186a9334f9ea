//! Read-only registry views for `list`, `info` and `tree`.
//!
//! These never fail on a broken package: problems are shown next to the
//! item they concern. Only an unreadable index is an error.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::core::header::parse_header;
use crate::core::includes::{parse_includes, IncludeEntry};
use crate::core::index::{IndexEntry, RegistryIndex};
use crate::core::package::Package;
use crate::core::registry::RegistryLayout;
use crate::ops::validate::{validate_source, Expected};
use crate::util::fs::read_to_string;

/// One index entry and its on-disk status.
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub name: String,
    pub version: String,
    pub entry: String,
    pub entry_exists: bool,
    /// The entry header, when it parses
    pub header: Option<String>,
}

/// A source file with its validated identity or the reason it failed.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub path: String,
    pub identity: Option<String>,
    pub error: Option<String>,
}

/// Everything `info` shows about one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDetails {
    #[serde(flatten)]
    pub summary: PackageSummary,
    pub sources: Vec<SourceSummary>,
    pub includes: Vec<IncludeEntry>,
    pub includes_error: Option<String>,
}

/// Load and parse `registry/index.json`.
pub fn load_index(layout: &RegistryLayout) -> Result<RegistryIndex> {
    let path = layout.index_path();
    let content = read_to_string(&path).context("failed to read registry index")?;
    RegistryIndex::parse(&content)
        .with_context(|| format!("invalid registry index: {}", path.display()))
}

/// Summaries of every index entry, in index order.
pub fn list_packages(root: &Path) -> Result<Vec<PackageSummary>> {
    let layout = RegistryLayout::new(root);
    let index = load_index(&layout)?;
    Ok(index
        .packages
        .iter()
        .map(|entry| summarize(&layout, entry))
        .collect())
}

/// Details of one index entry.
pub fn package_details(root: &Path, name: &str) -> Result<PackageDetails> {
    let layout = RegistryLayout::new(root);
    let index = load_index(&layout)?;

    let Some(entry) = index.find(name) else {
        let available: Vec<&str> = index.names().collect();
        bail!(
            "package '{}' is not in the registry index\n\
             help: available packages: {}",
            name,
            available.join(", ")
        );
    };

    let summary = summarize(&layout, entry);
    let sources = source_summaries(&layout, entry);

    let entry_path = layout.resolve(&entry.entry);
    let (includes, includes_error) = match std::fs::read_to_string(&entry_path) {
        Ok(content) => match parse_includes(&content) {
            Ok(includes) => (includes, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        },
        Err(_) => (Vec::new(), None),
    };

    Ok(PackageDetails {
        summary,
        sources,
        includes,
        includes_error,
    })
}

/// Render an entry file and its includes as a tree.
pub fn format_include_tree(root: &Path, details: &PackageDetails) -> String {
    let layout = RegistryLayout::new(root);
    let entry_path = layout.resolve(&details.summary.entry);
    let base = entry_path.parent().unwrap_or(root);

    let mut output = String::new();
    writeln!(
        output,
        "{} v{} ({})",
        details.summary.name, details.summary.version, details.summary.entry
    )
    .unwrap();

    if let Some(error) = &details.includes_error {
        writeln!(output, "└── (invalid INCLUDES block: {})", error).unwrap();
        return output;
    }

    let count = details.includes.len();
    for (i, include) in details.includes.iter().enumerate() {
        let branch = if i + 1 == count { "└── " } else { "├── " };
        let marker = if base.join(&include.path).is_file() {
            ""
        } else {
            " (missing)"
        };
        writeln!(
            output,
            "{}{} → {}{}",
            branch, include.facet, include.path, marker
        )
        .unwrap();
    }

    output
}

fn summarize(layout: &RegistryLayout, entry: &IndexEntry) -> PackageSummary {
    let entry_path = layout.resolve(&entry.entry);
    let entry_exists = entry_path.is_file();
    let header = if entry_exists {
        std::fs::read_to_string(&entry_path)
            .ok()
            .and_then(|content| parse_header(&content).ok())
            .map(|h| h.to_string())
    } else {
        None
    };

    PackageSummary {
        name: entry.name.to_string(),
        version: entry.version.to_string(),
        entry: entry.entry.clone(),
        entry_exists,
        header,
    }
}

fn source_summaries(layout: &RegistryLayout, entry: &IndexEntry) -> Vec<SourceSummary> {
    let dir = layout.package_dir(entry.name.as_str());
    let package = match Package::scan(entry.name.as_str(), &dir) {
        Ok(package) => package,
        Err(e) => {
            tracing::debug!("cannot scan {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let expected = Expected {
        feature: &entry.name,
        version: &entry.version,
    };

    package
        .sources()
        .iter()
        .map(|source| {
            let display = layout.display(&source.path);
            match validate_source(&source.path, &source.relative, &display, Some(expected)) {
                Ok(identity) => SourceSummary {
                    path: display,
                    identity: Some(identity.to_string()),
                    error: None,
                },
                Err(e) => SourceSummary {
                    path: display,
                    identity: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}
