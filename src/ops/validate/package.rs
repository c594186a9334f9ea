//! Per-package checks: entry file, includes, identities and entry uniqueness.

use std::collections::BTreeMap;
use std::fs;

use crate::core::facet::Facet;
use crate::core::identity::SourceIdentity;
use crate::core::index::IndexEntry;
use crate::core::package::Package;
use crate::core::registry::RegistryLayout;

use super::errors::ValidationError;
use super::includes::resolve_includes;
use super::source::{Expected, SourceCache};
use super::types::PackageReport;

/// Check one indexed package against its scanned directory.
///
/// The caller has already verified that the entry path lies under the
/// package directory and exists.
pub fn check_package(layout: &RegistryLayout, entry: &IndexEntry, package: &Package) -> PackageReport {
    let mut report = PackageReport::new(entry.name.as_str(), entry.version.as_str(), &entry.entry);
    let mut violations = Vec::new();
    let mut cache = SourceCache::new(
        layout,
        package.root(),
        Expected {
            feature: &entry.name,
            version: &entry.version,
        },
    );

    let entry_path = layout.resolve(&entry.entry);
    let entry_display = layout.display(&entry_path);

    // Entry file
    let entry_ok = match cache.check(&entry_path, &mut violations) {
        Some(identity) if identity.facet.is_entry() => true,
        Some(identity) => {
            violations.push(ValidationError::EntryFacet {
                path: entry_display.clone(),
                found: identity.facet,
            });
            false
        }
        None => false,
    };

    // Includes
    match fs::read_to_string(&entry_path) {
        Ok(content) => {
            report.includes = resolve_includes(&entry_path, &content, &mut cache, &mut violations);
        }
        Err(e) if entry_ok => violations.push(ValidationError::io(&entry_display, &e)),
        Err(_) => {}
    }

    // Every source file, with duplicate detection
    let mut seen: BTreeMap<SourceIdentity, String> = BTreeMap::new();
    let mut intent_files = Vec::new();
    for source in package.sources() {
        let Some(identity) = cache.check(&source.path, &mut violations) else {
            continue;
        };
        let display = layout.display(&source.path);

        if identity.facet == Facet::Intent {
            intent_files.push(display.clone());
        }

        if let Some(first) = seen.get(&identity) {
            violations.push(ValidationError::DuplicateIdentity {
                identity: identity.to_string(),
                first: first.clone(),
                second: display,
            });
        } else {
            seen.insert(identity, display);
        }
    }

    if entry_ok {
        if let Some(violation) = check_entry_unique(package.name(), &entry_display, intent_files) {
            violations.push(violation);
        }
    }

    report.files_validated = cache.passed();
    report.violations = violations;

    tracing::debug!(
        "package {}: {} file(s) validated, {} violation(s)",
        package.name(),
        report.files_validated,
        report.violations.len()
    );

    report
}

/// Exactly one intent file may exist, and it must be the declared entry.
fn check_entry_unique(
    package: &str,
    entry_display: &str,
    intent_files: Vec<String>,
) -> Option<ValidationError> {
    match intent_files.as_slice() {
        [only] if only == entry_display => None,
        [_, _, ..] => Some(ValidationError::MultipleEntries {
            package: package.to_string(),
            paths: intent_files,
        }),
        _ => Some(ValidationError::EntryNotUnique {
            package: package.to_string(),
            expected: entry_display.to_string(),
            found: intent_files,
        }),
    }
}
