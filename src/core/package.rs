//! Package - a directory of source files scanned once from disk.
//!
//! Validation stages all work from the same `Package` value, so the file
//! set cannot change between the per-file, duplicate and entry checks.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::facet::SOURCE_EXTENSION;
use crate::core::registry::STALE_MANIFEST;

/// A source file inside a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Full path on disk
    pub path: PathBuf,
    /// Path relative to the package root
    pub relative: PathBuf,
}

/// A package directory on disk.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    root: PathBuf,
    sources: Vec<SourceFile>,
    stale_manifests: Vec<PathBuf>,
}

impl Package {
    /// Scan a package directory recursively.
    ///
    /// Source files are returned in a stable order (sorted by relative path).
    /// Symlinks are followed and listed under their link path.
    pub fn scan(name: impl Into<String>, root: &Path) -> io::Result<Self> {
        let mut sources = Vec::new();
        let mut stale_manifests = Vec::new();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if entry.file_name() == STALE_MANIFEST {
                stale_manifests.push(path.to_path_buf());
                continue;
            }

            if is_source_file(path) {
                let relative = path
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.to_path_buf());
                sources.push(SourceFile {
                    path: path.to_path_buf(),
                    relative,
                });
            }
        }

        sources.sort();
        tracing::debug!(
            "scanned package {}: {} source file(s)",
            root.display(),
            sources.len()
        );

        Ok(Package {
            name: name.into(),
            root: root.to_path_buf(),
            sources,
            stale_manifests,
        })
    }

    /// Directory name of the package.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files, sorted by relative path.
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// Deprecated manifest files found anywhere in the package.
    pub fn stale_manifests(&self) -> &[PathBuf] {
        &self.stale_manifests
    }
}

/// Whether a path has the source extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}
