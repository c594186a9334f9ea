//! Test fixtures for registry scenarios.
//!
//! `RegistryFixture` writes a registry into a temporary directory: an index,
//! package directories and their source files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Builder for an on-disk registry rooted in a temp directory.
pub struct RegistryFixture {
    dir: TempDir,
    packages: Vec<(String, String, String)>,
    raw_index: Option<String>,
}

impl RegistryFixture {
    /// Create an empty registry (`registry/packages/` exists, no index yet).
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("registry/packages")).expect("create packages dir");
        RegistryFixture {
            dir,
            packages: Vec::new(),
            raw_index: None,
        }
    }

    /// The E2E registry: `weather` with an entry including its schema.
    pub fn weather() -> Self {
        RegistryFixture::new()
            .package("weather", "1.0")
            .file("weather", "weather.schema.intent", "AIM: weather#schema@1.0\n")
            .entry_includes("weather", &[("schema", "weather.schema.intent")])
            .build()
    }

    /// Registry root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a package directory.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root().join("registry/packages").join(name)
    }

    /// Add an indexed package with a valid `<name>.intent` entry file.
    pub fn package(self, name: &str, version: &str) -> Self {
        let entry = format!("{}.intent", name);
        let header = format!("AIM: {}#intent@{}\n", name, version);
        self.package_with_entry(name, version, &entry)
            .file(name, &entry, &header)
    }

    /// Add an index entry pointing at `<package dir>/<entry>` without
    /// writing the entry file.
    pub fn package_with_entry(mut self, name: &str, version: &str, entry: &str) -> Self {
        fs::create_dir_all(self.package_dir(name)).expect("create package dir");
        self.packages.push((
            name.to_string(),
            version.to_string(),
            format!("registry/packages/{}/{}", name, entry),
        ));
        self
    }

    /// Write a file relative to a package directory.
    pub fn file(self, package: &str, rel: &str, content: &str) -> Self {
        let path = self.package_dir(package).join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture file");
        self
    }

    /// Rewrite `<name>.intent` with an includes block.
    pub fn entry_includes(self, name: &str, includes: &[(&str, &str)]) -> Self {
        let version = self
            .packages
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, _)| v.clone())
            .expect("package registered before entry_includes");

        let mut content = format!("AIM: {}#intent@{}\n\nINCLUDES {{\n", name, version);
        for (key, path) in includes {
            content.push_str(&format!("  {}: \"{}\"\n", key, path));
        }
        content.push_str("}\n");

        let entry = format!("{}.intent", name);
        self.file(name, &entry, &content)
    }

    /// Create a package directory that the index does not list.
    pub fn unlisted_dir(self, name: &str) -> Self {
        fs::create_dir_all(self.package_dir(name)).expect("create package dir");
        self
    }

    /// Use raw text as `registry/index.json` instead of the generated one.
    pub fn raw_index(mut self, content: &str) -> Self {
        self.raw_index = Some(content.to_string());
        self
    }

    /// Write the index and finish.
    pub fn build(self) -> Self {
        let content = match &self.raw_index {
            Some(raw) => raw.clone(),
            None => self.index_json(),
        };
        fs::write(self.root().join("registry/index.json"), content).expect("write index");
        self
    }

    fn index_json(&self) -> String {
        let packages: Vec<serde_json::Value> = self
            .packages
            .iter()
            .map(|(name, version, entry)| {
                serde_json::json!({ "name": name, "version": version, "entry": entry })
            })
            .collect();
        let index = serde_json::json!({ "version": "1.0", "packages": packages });
        serde_json::to_string_pretty(&index).expect("serialize index")
    }
}

impl Default for RegistryFixture {
    fn default() -> Self {
        Self::new()
    }
}
