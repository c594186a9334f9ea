//! Registry layout - where things live under a registry root.
//!
//! ```text
//! <root>/
//! └── registry/
//!     ├── index.json
//!     └── packages/
//!         ├── weather/
//!         │   ├── weather.intent
//!         │   └── weather.schema.intent
//!         └── billing.invoice/
//!             └── ...
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::util::fs::display_path;

/// Registry directory under the root.
pub const REGISTRY_DIR: &str = "registry";

/// Index file name inside the registry directory.
pub const INDEX_FILE: &str = "index.json";

/// Packages directory inside the registry directory.
pub const PACKAGES_DIR: &str = "packages";

/// Per-package manifest from the previous registry format.
pub const STALE_MANIFEST: &str = "package.json";

/// Paths of a registry rooted at a directory.
#[derive(Debug, Clone)]
pub struct RegistryLayout {
    root: PathBuf,
}

impl RegistryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RegistryLayout { root: root.into() }
    }

    /// The registry root (the directory containing `registry/`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(REGISTRY_DIR).join(INDEX_FILE)
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(REGISTRY_DIR).join(PACKAGES_DIR)
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir().join(name)
    }

    /// The prefix every entry path of package `name` must start with.
    pub fn entry_prefix(name: &str) -> String {
        format!("{}/{}/{}/", REGISTRY_DIR, PACKAGES_DIR, name)
    }

    /// Resolve a root-relative, `/`-separated path from the index.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    /// Render a path for messages, relative to the root when possible.
    pub fn display(&self, path: &Path) -> String {
        display_path(&self.root, path)
    }

    /// Names and paths of the package directories on disk, sorted by name.
    pub fn package_dirs(&self) -> io::Result<Vec<(String, PathBuf)>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(self.packages_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            dirs.push((name, entry.path()));
        }
        dirs.sort();
        Ok(dirs)
    }
}
