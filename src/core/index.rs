//! Registry index (`registry/index.json`) parsing and schema checks.
//!
//! ## Example index.json
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "packages": [
//!     {
//!       "name": "weather",
//!       "version": "1.0",
//!       "entry": "registry/packages/weather/weather.intent"
//!     }
//!   ]
//! }
//! ```
//!
//! The document is walked as a `serde_json::Value` rather than deserialized
//! straight into structs so every schema violation can name the exact field
//! that is wrong.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::facet::{is_valid_feature, is_valid_version, FeatureName, Version, SOURCE_EXTENSION};

/// A schema violation in the index document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// One published package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub name: FeatureName,
    pub version: Version,
    /// Registry-root-relative path of the entry file
    pub entry: String,
}

/// The parsed registry index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryIndex {
    pub version: String,
    pub packages: Vec<IndexEntry>,
}

impl RegistryIndex {
    /// Parse and schema-check index JSON text.
    pub fn parse(content: &str) -> Result<Self, IndexParseError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| IndexParseError::Json(e.to_string()))?;
        Self::from_value(&value).map_err(IndexParseError::Schema)
    }

    /// Schema-check an already parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let root = value
            .as_object()
            .ok_or_else(|| schema("top-level value must be an object"))?;

        let version = require(root, "version", "")?
            .as_str()
            .ok_or_else(|| schema("'version' must be a string"))?
            .to_string();

        let packages = require(root, "packages", "")?
            .as_array()
            .ok_or_else(|| schema("'packages' must be an array"))?;
        if packages.is_empty() {
            return Err(schema("'packages' must be a non-empty array"));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(packages.len());
        for (i, pkg) in packages.iter().enumerate() {
            let entry = parse_entry(pkg, i)?;
            if !seen.insert(entry.name.clone()) {
                return Err(schema(format!(
                    "packages[{}]: duplicate package name '{}'",
                    i, entry.name
                )));
            }
            entries.push(entry);
        }

        Ok(RegistryIndex {
            version,
            packages: entries,
        })
    }

    /// Look up a package by name.
    pub fn find(&self, name: &str) -> Option<&IndexEntry> {
        self.packages.iter().find(|p| p.name.as_str() == name)
    }

    /// Package names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }
}

/// Failure to turn index text into a [`RegistryIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexParseError {
    #[error("invalid JSON ({0})")]
    Json(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn schema(msg: impl Into<String>) -> SchemaError {
    SchemaError(msg.into())
}

fn require<'a>(obj: &'a Map<String, Value>, key: &str, ctx: &str) -> Result<&'a Value, SchemaError> {
    obj.get(key)
        .ok_or_else(|| schema(format!("{}missing required key '{}'", ctx, key)))
}

fn parse_entry(value: &Value, i: usize) -> Result<IndexEntry, SchemaError> {
    let ctx = format!("packages[{}]: ", i);
    let obj = value
        .as_object()
        .ok_or_else(|| schema(format!("{}entry must be an object", ctx)))?;

    let name = require(obj, "name", &ctx)?
        .as_str()
        .ok_or_else(|| schema(format!("{}'name' must be a string", ctx)))?;
    if !is_valid_feature(name) {
        return Err(schema(format!(
            "{}invalid 'name' '{}', expected lowercase namespace segments separated by dots",
            ctx, name
        )));
    }

    let version = require(obj, "version", &ctx)?
        .as_str()
        .ok_or_else(|| schema(format!("{}'version' must be a string", ctx)))?;
    if !is_valid_version(version) {
        return Err(schema(format!(
            "{}invalid 'version' '{}', expected x.y",
            ctx, version
        )));
    }

    let entry = require(obj, "entry", &ctx)?
        .as_str()
        .ok_or_else(|| schema(format!("{}'entry' must be a string", ctx)))?;
    if !entry.ends_with(&format!(".{}", SOURCE_EXTENSION)) {
        return Err(schema(format!(
            "{}'entry' must be a .{} path, got '{}'",
            ctx, SOURCE_EXTENSION, entry
        )));
    }

    Ok(IndexEntry {
        name: FeatureName::parse(name).map_err(|e| schema(format!("{}{}", ctx, e)))?,
        version: Version::parse(version).map_err(|e| schema(format!("{}{}", ctx, e)))?,
        entry: entry.to_string(),
    })
}
