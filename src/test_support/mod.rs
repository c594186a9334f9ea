//! Test utilities for sinth unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::fixtures::RegistryFixture;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = RegistryFixture::weather();
//!     let report = validate_registry(&ValidateOptions::for_root(fixture.root()));
//!     assert!(report.passed);
//! }
//! ```

pub mod fixtures;

pub use fixtures::RegistryFixture;
