//! Single-file validation: header, path identity and package agreement.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::facet::{FeatureName, Version};
use crate::core::header::parse_header;
use crate::core::identity::{derive_identity, SourceIdentity};
use crate::core::registry::RegistryLayout;

use super::errors::ValidationError;

/// Feature and version every file of a package must declare.
#[derive(Debug, Clone, Copy)]
pub struct Expected<'a> {
    pub feature: &'a FeatureName,
    pub version: &'a Version,
}

/// Validate one source file on disk.
///
/// `relative` is the path used for identity derivation (relative to the
/// package root); `display` is the path shown in messages.
pub fn validate_source(
    path: &Path,
    relative: &Path,
    display: &str,
    expected: Option<Expected<'_>>,
) -> Result<SourceIdentity, ValidationError> {
    let content = fs::read_to_string(path).map_err(|e| ValidationError::io(display, &e))?;
    validate_content(&content, relative, display, expected)
}

/// Validate already-loaded file content.
pub fn validate_content(
    content: &str,
    relative: &Path,
    display: &str,
    expected: Option<Expected<'_>>,
) -> Result<SourceIdentity, ValidationError> {
    let header = parse_header(content).map_err(|e| ValidationError::from_header(display, e))?;
    let derived = derive_identity(relative).map_err(|e| ValidationError::from_path(display, e))?;

    if header.feature != derived.feature || header.facet != derived.facet {
        return Err(ValidationError::IdentityMismatch {
            path: display.to_string(),
            declared: format!("{}#{}", header.feature, header.facet),
            derived: format!("{}#{}", derived.feature, derived.facet),
        });
    }

    if let Some(expected) = expected {
        if &header.feature != expected.feature {
            return Err(ValidationError::PackageMismatch {
                path: display.to_string(),
                field: "feature",
                found: header.feature.to_string(),
                expected: expected.feature.to_string(),
            });
        }
        if &header.version != expected.version {
            return Err(ValidationError::PackageMismatch {
                path: display.to_string(),
                field: "version",
                found: header.version.to_string(),
                expected: expected.version.to_string(),
            });
        }
    }

    Ok(SourceIdentity {
        feature: header.feature,
        facet: header.facet,
        version: header.version,
    })
}

/// Validation results for the files of one package.
///
/// A file reached from several places (entry, include target, directory
/// scan) is validated once, and its violation is recorded once.
pub struct SourceCache<'a> {
    layout: &'a RegistryLayout,
    package_root: &'a Path,
    expected: Expected<'a>,
    results: BTreeMap<PathBuf, Option<SourceIdentity>>,
}

impl<'a> SourceCache<'a> {
    pub fn new(layout: &'a RegistryLayout, package_root: &'a Path, expected: Expected<'a>) -> Self {
        SourceCache {
            layout,
            package_root,
            expected,
            results: BTreeMap::new(),
        }
    }

    /// Root-relative display form of a path.
    pub fn display(&self, path: &Path) -> String {
        self.layout.display(path)
    }

    /// Validate `path`, pushing a violation the first time it fails.
    pub fn check(
        &mut self,
        path: &Path,
        violations: &mut Vec<ValidationError>,
    ) -> Option<SourceIdentity> {
        if let Some(result) = self.results.get(path) {
            return result.clone();
        }

        let shown = self.display(path);
        let relative = path.strip_prefix(self.package_root).unwrap_or(path);
        let result = match validate_source(path, relative, &shown, Some(self.expected)) {
            Ok(identity) => {
                tracing::debug!("{}: {}", shown, identity);
                Some(identity)
            }
            Err(e) => {
                violations.push(e);
                None
            }
        };

        self.results.insert(path.to_path_buf(), result.clone());
        result
    }

    /// Number of files that validated cleanly.
    pub fn passed(&self) -> usize {
        self.results.values().filter(|r| r.is_some()).count()
    }
}
