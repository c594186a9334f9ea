//! Facet, feature name and version - the typed atoms of a source identity.
//!
//! Every source file in a registry declares a `(feature, facet, version)`
//! triple. These newtypes enforce their grammars at construction time so
//! later stages compare typed values instead of raw strings.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// File extension (without dot) for AIM source files.
pub const SOURCE_EXTENSION: &str = "intent";

/// One structural aspect of a feature's specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Intent,
    Schema,
    Flow,
    Contract,
    Persona,
    View,
    Event,
    Mapping,
}

impl Facet {
    /// All facets, in declaration order.
    pub const ALL: [Facet; 8] = [
        Facet::Intent,
        Facet::Schema,
        Facet::Flow,
        Facet::Contract,
        Facet::Persona,
        Facet::View,
        Facet::Event,
        Facet::Mapping,
    ];

    /// The lowercase keyword used in headers, paths and include keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Intent => "intent",
            Facet::Schema => "schema",
            Facet::Flow => "flow",
            Facet::Contract => "contract",
            Facet::Persona => "persona",
            Facet::View => "view",
            Facet::Event => "event",
            Facet::Mapping => "mapping",
        }
    }

    /// Look up a facet by its keyword.
    pub fn from_keyword(s: &str) -> Option<Facet> {
        Facet::ALL.iter().copied().find(|f| f.as_str() == s)
    }

    /// Whether this is the entry facet.
    pub fn is_entry(&self) -> bool {
        matches!(self, Facet::Intent)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facet::from_keyword(s).ok_or_else(|| GrammarError::UnknownFacet(s.to_string()))
    }
}

/// A grammar violation in one of the identity atoms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid feature name '{0}', expected lowercase alphanumeric segments separated by dots")]
    InvalidFeature(String),

    #[error("unknown facet '{0}', expected one of: {facets}", facets = facet_list())]
    UnknownFacet(String),

    #[error("invalid version '{0}', expected x.y")]
    InvalidVersion(String),
}

fn facet_list() -> String {
    Facet::ALL
        .iter()
        .map(Facet::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A dotted, lowercase alphanumeric feature name such as `weather` or
/// `billing.invoice`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureName(String);

impl FeatureName {
    /// Parse and validate a feature name.
    pub fn parse(s: &str) -> Result<Self, GrammarError> {
        if is_valid_feature(s) {
            Ok(FeatureName(s.to_string()))
        } else {
            Err(GrammarError::InvalidFeature(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check the feature grammar: `[a-z0-9]+(\.[a-z0-9]+)*`.
pub fn is_valid_feature(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FeatureName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A `major.minor` version string.
///
/// Versions are compared textually: `1.0` and `1.00` are different versions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(String);

impl Version {
    /// Parse and validate a version.
    pub fn parse(s: &str) -> Result<Self, GrammarError> {
        if is_valid_version(s) {
            Ok(Version(s.to_string()))
        } else {
            Err(GrammarError::InvalidVersion(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check the version grammar: `\d+\.\d+`.
pub fn is_valid_version(s: &str) -> bool {
    match s.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
