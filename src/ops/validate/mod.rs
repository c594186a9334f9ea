//! Registry validation.
//!
//! The `validate` command proves a registry is internally consistent before
//! it is published or consumed.
//!
//! ## Usage
//!
//! ```bash
//! sinth validate                      # Validate the registry in the current directory
//! sinth validate path/to/root         # Validate another registry root
//! sinth validate --fail-fast          # Stop at the first violation
//! sinth validate --format github      # GitHub Actions output
//! ```
//!
//! ## Validation Steps
//!
//! 1. Load `registry/index.json` and check its schema
//! 2. Check that `registry/packages/` exists
//! 3. Reject stale `package.json` manifests
//! 4. Reconcile index names with package directories
//! 5. Check each indexed package (entry, includes, identities)
//!
//! Steps 1 and 2 abort the run when they fail. Everything else is collected
//! into one ordered report.
//!
//! ## Output Formats
//!
//! - `human`: `[OK]` / `[FAIL]` lines
//! - `json`: Machine-readable JSON output
//! - `github`: GitHub Actions annotations with job summary

mod errors;
mod format;
mod includes;
mod package;
mod source;
mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Instant;

use rayon::prelude::*;

use crate::core::index::{IndexEntry, IndexParseError, RegistryIndex};
use crate::core::package::Package;
use crate::core::registry::RegistryLayout;

// Re-export public types
pub use self::errors::ValidationError;
pub use self::format::{format_report, format_report_for_output};
pub use self::includes::resolve_includes;
pub use self::package::check_package;
pub use self::source::{validate_content, validate_source, Expected, SourceCache};
pub use self::types::{
    OutputFormat, OutputFormatParseError, PackageReport, ResolvedInclude, ValidateOptions,
    ValidationReport,
};

/// Validate the registry at `options.root`.
///
/// Never fails: every problem, including a missing index, becomes a
/// violation in the returned report.
pub fn validate_registry(options: &ValidateOptions) -> ValidationReport {
    let start = Instant::now();
    let layout = RegistryLayout::new(&options.root);
    let mut report = ValidationReport::new(&options.root);

    tracing::info!("Validating registry at {}", options.root.display());
    run_checks(&layout, options, &mut report);

    if options.fail_fast {
        report.keep_first_violation();
    }
    report.duration = start.elapsed();

    tracing::info!(
        "{} package(s) checked, {} violation(s) in {:.2}s",
        report.packages.len(),
        report.violation_count(),
        report.duration.as_secs_f64()
    );
    report
}

fn run_checks(layout: &RegistryLayout, options: &ValidateOptions, report: &mut ValidationReport) {
    // Step 1: index
    let Some(index) = load_index(layout, report) else {
        return;
    };
    report.index_version = Some(index.version.clone());

    // Step 2: packages directory
    let packages_dir = layout.packages_dir();
    if !packages_dir.is_dir() {
        report.add_violation(ValidationError::PackagesDirNotFound {
            path: layout.display(&packages_dir),
        });
        return;
    }

    let dirs = match layout.package_dirs() {
        Ok(dirs) => dirs,
        Err(e) => {
            report.add_violation(ValidationError::io(&layout.display(&packages_dir), &e));
            return;
        }
    };

    if let Some(j) = options.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j)
            .build_global()
            .ok(); // Ignore if already set
    }

    // Scan every package directory once
    let scans: Vec<_> = dirs
        .par_iter()
        .map(|(name, path)| (name.clone(), Package::scan(name.as_str(), path)))
        .collect();

    let mut packages = BTreeMap::new();
    for (name, scan) in scans {
        match scan {
            Ok(pkg) => {
                packages.insert(name, pkg);
            }
            Err(e) => {
                let path = layout.package_dir(&name);
                report.add_violation(ValidationError::io(&layout.display(&path), &e));
            }
        }
    }

    // Step 3: stale manifests
    let mut stale: Vec<String> = packages
        .values()
        .flat_map(|pkg| pkg.stale_manifests().iter().map(|p| layout.display(p)))
        .collect();
    if !stale.is_empty() {
        stale.sort();
        report.add_violation(ValidationError::StaleManifest { paths: stale });
    }

    // Step 4: index names vs directories
    let on_disk: BTreeSet<&str> = dirs.iter().map(|(name, _)| name.as_str()).collect();
    let indexed: BTreeSet<&str> = index.names().collect();
    let missing_in_index: Vec<String> = on_disk.difference(&indexed).map(|s| s.to_string()).collect();
    let missing_on_disk: Vec<String> = indexed.difference(&on_disk).map(|s| s.to_string()).collect();
    if !missing_in_index.is_empty() || !missing_on_disk.is_empty() {
        report.add_violation(ValidationError::PackageIndexMismatch {
            missing_in_index,
            missing_on_disk,
        });
    }

    // Step 5: per-package checks, in index order
    let results: Vec<Option<PackageReport>> = index
        .packages
        .par_iter()
        .map(|entry| {
            let package = packages.get(entry.name.as_str())?;
            Some(check_indexed_package(layout, entry, package))
        })
        .collect();

    for pkg in results.into_iter().flatten() {
        report.add_package(pkg);
    }
}

fn load_index(layout: &RegistryLayout, report: &mut ValidationReport) -> Option<RegistryIndex> {
    let index_path = layout.index_path();
    let display = layout.display(&index_path);

    if !index_path.is_file() {
        report.add_violation(ValidationError::IndexNotFound { path: display });
        return None;
    }

    let content = match fs::read_to_string(&index_path) {
        Ok(content) => content,
        Err(e) => {
            report.add_violation(ValidationError::io(&display, &e));
            return None;
        }
    };

    match RegistryIndex::parse(&content) {
        Ok(index) => {
            tracing::debug!("index lists {} package(s)", index.packages.len());
            Some(index)
        }
        Err(IndexParseError::Json(message)) => {
            report.add_violation(ValidationError::IndexJson {
                path: display,
                message,
            });
            None
        }
        Err(IndexParseError::Schema(e)) => {
            report.add_violation(ValidationError::IndexSchema {
                path: display,
                message: e.to_string(),
            });
            None
        }
    }
}

/// Entry path checks, then the package checker.
fn check_indexed_package(
    layout: &RegistryLayout,
    entry: &IndexEntry,
    package: &Package,
) -> PackageReport {
    let name = entry.name.as_str();
    let prefix = RegistryLayout::entry_prefix(name);

    if !entry.entry.starts_with(&prefix) || entry.entry.split('/').any(|seg| seg == "..") {
        let mut report = PackageReport::new(name, entry.version.as_str(), &entry.entry);
        report.violations.push(ValidationError::EntryPathPrefix {
            package: name.to_string(),
            entry: entry.entry.clone(),
            expected_prefix: prefix,
        });
        return report;
    }

    if !layout.resolve(&entry.entry).is_file() {
        let mut report = PackageReport::new(name, entry.version.as_str(), &entry.entry);
        report.violations.push(ValidationError::MissingEntryFile {
            package: name.to_string(),
            entry: entry.entry.clone(),
        });
        return report;
    }

    check_package(layout, entry, package)
}
