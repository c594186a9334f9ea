//! sinth - validation engine for AIM source registries
//!
//! This crate provides the core library functionality for sinth: parsing
//! facet headers and include blocks, deriving identities from file paths,
//! and cross-checking a registry index against its package directories.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for sinth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides on-disk registry fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Facet, FeatureName, Package, RegistryIndex, SourceIdentity, Version};
pub use ops::validate::{validate_registry, ValidateOptions, ValidationError, ValidationReport};
pub use util::context::GlobalContext;
