//! High-level operations.
//!
//! This module contains the implementation of sinth commands.

pub mod inspect;
pub mod validate;

pub use inspect::{
    format_include_tree, list_packages, package_details, PackageDetails, PackageSummary,
    SourceSummary,
};
pub use validate::{
    format_report, format_report_for_output, validate_registry, OutputFormat, ValidateOptions,
    ValidationError, ValidationReport,
};
