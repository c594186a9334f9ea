//! Core data structures for sinth.
//!
//! This module contains the foundational types of the registry format:
//! - Facets, feature names and versions
//! - Line-1 headers and `INCLUDES` blocks
//! - Path-derived identities
//! - The registry index, layout and scanned packages

pub mod facet;
pub mod header;
pub mod identity;
pub mod includes;
pub mod index;
pub mod package;
pub mod registry;

pub use facet::{Facet, FeatureName, Version};
pub use header::{parse_header, Header};
pub use identity::{derive_identity, PathIdentity, SourceIdentity};
pub use includes::{parse_includes, IncludeEntry};
pub use index::{IndexEntry, RegistryIndex};
pub use package::{Package, SourceFile};
pub use registry::RegistryLayout;
