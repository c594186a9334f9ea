//! Path-derived source identity.
//!
//! A file's location inside its package determines the identity it must
//! declare. Two layouts are recognised, distinguished only by path shape:
//!
//! ```text
//! weather/
//! ├── weather.intent            flat:   weather#intent
//! ├── weather.schema.intent     flat:   weather#schema
//! ├── my.module.intent          flat:   my.module#intent  (`module` is not a facet)
//! └── sub.feature/
//!     └── contract.intent       nested: sub.feature#contract
//! ```

use std::fmt;
use std::path::{Component, Path};

use serde::Serialize;
use thiserror::Error;

use crate::core::facet::{Facet, FeatureName, Version, SOURCE_EXTENSION};

/// Which naming convention a path follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Single path segment: `<feature>[.<facet>].intent`
    Flat,
    /// Directories name the feature, the stem names the facet.
    Nested,
}

/// The `(feature, facet)` pair a path implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdentity {
    pub feature: FeatureName,
    pub facet: Facet,
    pub layout: Layout,
}

/// A fully validated identity: header and path agree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceIdentity {
    pub feature: FeatureName,
    pub facet: Facet,
    pub version: Version,
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.feature, self.facet, self.version)
    }
}

/// Why a path cannot carry a source identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("expected a `.{ext}` file", ext = SOURCE_EXTENSION)]
    WrongExtension,

    #[error("path must be relative to the package root and contain only plain segments")]
    NotRelative,

    #[error("path is not valid UTF-8")]
    NonUtf8,

    #[error("derived feature '{0}' is not a valid feature name")]
    InvalidFeature(String),

    #[error("derived facet '{0}' is not a recognized facet")]
    UnknownFacet(String),
}

/// Derive the identity a file at `relative_path` (relative to its package
/// root) must declare.
pub fn derive_identity(relative_path: &Path) -> Result<PathIdentity, PathError> {
    let mut segments = Vec::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_str().ok_or(PathError::NonUtf8)?),
            Component::CurDir => {}
            _ => return Err(PathError::NotRelative),
        }
    }

    let (file_name, dirs) = segments.split_last().ok_or(PathError::NotRelative)?;
    let stem = file_name
        .strip_suffix(SOURCE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .filter(|s| !s.is_empty())
        .ok_or(PathError::WrongExtension)?;

    if dirs.is_empty() {
        derive_flat(stem)
    } else {
        derive_nested(dirs, stem)
    }
}

fn derive_flat(stem: &str) -> Result<PathIdentity, PathError> {
    let (feature, facet) = match stem.rsplit_once('.') {
        Some((head, tail)) => match Facet::from_keyword(tail) {
            Some(facet) => (head, facet),
            None => (stem, Facet::Intent),
        },
        None => (stem, Facet::Intent),
    };

    Ok(PathIdentity {
        feature: parse_feature(feature)?,
        facet,
        layout: Layout::Flat,
    })
}

fn derive_nested(dirs: &[&str], stem: &str) -> Result<PathIdentity, PathError> {
    let feature = dirs.join(".");
    let facet = Facet::from_keyword(stem).ok_or_else(|| PathError::UnknownFacet(stem.to_string()))?;

    Ok(PathIdentity {
        feature: parse_feature(&feature)?,
        facet,
        layout: Layout::Nested,
    })
}

fn parse_feature(s: &str) -> Result<FeatureName, PathError> {
    FeatureName::parse(s).map_err(|_| PathError::InvalidFeature(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(path: &str) -> Result<(String, Facet, Layout), PathError> {
        derive_identity(Path::new(path))
            .map(|id| (id.feature.as_str().to_string(), id.facet, id.layout))
    }

    #[test]
    fn test_flat_entry() {
        assert_eq!(
            derive("weather.intent").unwrap(),
            ("weather".into(), Facet::Intent, Layout::Flat)
        );
    }

    #[test]
    fn test_flat_facet_split() {
        assert_eq!(
            derive("weather.schema.intent").unwrap(),
            ("weather".into(), Facet::Schema, Layout::Flat)
        );
        assert_eq!(
            derive("billing.invoice.mapping.intent").unwrap(),
            ("billing.invoice".into(), Facet::Mapping, Layout::Flat)
        );
    }

    #[test]
    fn test_flat_non_facet_suffix_stays_in_feature() {
        assert_eq!(
            derive("my.module.intent").unwrap(),
            ("my.module".into(), Facet::Intent, Layout::Flat)
        );
    }

    #[test]
    fn test_flat_every_facet_splits() {
        for facet in Facet::ALL {
            let name = format!("weather.{}.intent", facet);
            let (feature, derived, _) = derive(&name).unwrap();
            assert_eq!(feature, "weather");
            assert_eq!(derived, facet);
        }
    }

    #[test]
    fn test_flat_single_segment_is_always_feature() {
        assert_eq!(
            derive("schema.intent").unwrap(),
            ("schema".into(), Facet::Intent, Layout::Flat)
        );
        assert_eq!(
            derive("intent.intent").unwrap(),
            ("intent".into(), Facet::Intent, Layout::Flat)
        );
    }

    #[test]
    fn test_flat_explicit_intent_suffix() {
        assert_eq!(
            derive("weather.intent.intent").unwrap(),
            ("weather".into(), Facet::Intent, Layout::Flat)
        );
    }

    #[test]
    fn test_nested_layout() {
        assert_eq!(
            derive("sub.feature/contract.intent").unwrap(),
            ("sub.feature".into(), Facet::Contract, Layout::Nested)
        );
        assert_eq!(
            derive("weather/intent.intent").unwrap(),
            ("weather".into(), Facet::Intent, Layout::Nested)
        );
    }

    #[test]
    fn test_nested_directories_join_with_dots() {
        assert_eq!(
            derive("billing/invoice/event.intent").unwrap(),
            ("billing.invoice".into(), Facet::Event, Layout::Nested)
        );
    }

    #[test]
    fn test_nested_stem_must_be_facet() {
        assert_eq!(
            derive("weather/forecast.intent").unwrap_err(),
            PathError::UnknownFacet("forecast".into())
        );
        assert_eq!(
            derive("weather/weather.schema.intent").unwrap_err(),
            PathError::UnknownFacet("weather.schema".into())
        );
    }

    #[test]
    fn test_wrong_extension() {
        assert_eq!(derive("weather.ail").unwrap_err(), PathError::WrongExtension);
        assert_eq!(derive("weather").unwrap_err(), PathError::WrongExtension);
        assert_eq!(derive(".intent").unwrap_err(), PathError::WrongExtension);
        assert_eq!(derive("weatherintent").unwrap_err(), PathError::WrongExtension);
    }

    #[test]
    fn test_invalid_feature() {
        assert_eq!(
            derive("Weather.intent").unwrap_err(),
            PathError::InvalidFeature("Weather".into())
        );
        assert_eq!(
            derive("my-pkg/schema.intent").unwrap_err(),
            PathError::InvalidFeature("my-pkg".into())
        );
        assert_eq!(
            derive("weather..intent").unwrap_err(),
            PathError::InvalidFeature("weather.".into())
        );
    }

    #[test]
    fn test_rejects_non_relative_paths() {
        assert_eq!(
            derive("../weather.intent").unwrap_err(),
            PathError::NotRelative
        );
    }

    #[test]
    fn test_current_dir_segments_ignored() {
        assert_eq!(
            derive("./weather.flow.intent").unwrap(),
            ("weather".into(), Facet::Flow, Layout::Flat)
        );
    }
}
