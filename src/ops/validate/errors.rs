//! Validation error types and diagnostics.
//!
//! Each variant is one rule of the registry format. The `Display` text is
//! the single-line message printed after `[FAIL]`; it always names the
//! offending path (or package) and the rule that was broken. The miette
//! code is the stable rule identifier used by the JSON report.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::facet::Facet;
use crate::core::header::HeaderError;
use crate::core::identity::PathError;
use crate::core::includes::IncludesError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A single registry rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ValidationError {
    #[error("{path}: legacy metadata token '{token}' is not allowed")]
    #[diagnostic(code(sinth::header::legacy_token))]
    LegacyToken { path: String, token: String },

    #[error("{path}: first line must match AIM header grammar ({reason})")]
    #[diagnostic(code(sinth::header::grammar))]
    HeaderGrammar { path: String, reason: String },

    #[error("{path}: invalid source path ({reason})")]
    #[diagnostic(code(sinth::path::invalid))]
    InvalidPath { path: String, reason: String },

    #[error("{path}: header declares '{declared}' but path implies '{derived}'")]
    #[diagnostic(code(sinth::identity::mismatch))]
    IdentityMismatch {
        path: String,
        declared: String,
        derived: String,
    },

    #[error("{path}: header {field} '{found}' does not match package {field} '{expected}'")]
    #[diagnostic(code(sinth::identity::package_mismatch))]
    PackageMismatch {
        path: String,
        field: &'static str,
        found: String,
        expected: String,
    },

    #[error("{path}: line {line}: only one INCLUDES block is allowed")]
    #[diagnostic(code(sinth::includes::multiple_blocks))]
    MultipleIncludesBlock { path: String, line: usize },

    #[error("{path}: line {line}: malformed INCLUDES declaration, expected `INCLUDES {{`")]
    #[diagnostic(code(sinth::includes::malformed_declaration))]
    MalformedIncludesDeclaration { path: String, line: usize },

    #[error("{path}: line {line}: malformed INCLUDES entry '{text}', {reason}")]
    #[diagnostic(code(sinth::includes::malformed_entry))]
    MalformedIncludesEntry {
        path: String,
        line: usize,
        text: String,
        reason: String,
    },

    #[error("{path}: line {line}: duplicate INCLUDES key '{facet}'")]
    #[diagnostic(code(sinth::includes::duplicate_key))]
    DuplicateIncludeKey {
        path: String,
        line: usize,
        facet: Facet,
    },

    #[error("{path}: line {line}: INCLUDES block is never closed")]
    #[diagnostic(code(sinth::includes::unterminated))]
    UnterminatedIncludesBlock { path: String, line: usize },

    #[error("{path}: line {line}: INCLUDES block declares no entries")]
    #[diagnostic(code(sinth::includes::empty))]
    EmptyIncludesBlock { path: String, line: usize },

    #[error("{path}: include '{facet}' path '{include}' must be relative")]
    #[diagnostic(code(sinth::includes::absolute_path))]
    AbsolutePath {
        path: String,
        facet: Facet,
        include: String,
    },

    #[error("{path}: include '{facet}' path '{include}' must not contain '..'")]
    #[diagnostic(code(sinth::includes::path_traversal))]
    PathTraversal {
        path: String,
        facet: Facet,
        include: String,
    },

    #[error("{path}: include '{facet}' points back at the entry file itself")]
    #[diagnostic(code(sinth::includes::self_include))]
    SelfInclude { path: String, facet: Facet },

    #[error("{path}: include '{facet}' path '{include}' must end with .intent")]
    #[diagnostic(code(sinth::includes::wrong_extension))]
    WrongExtension {
        path: String,
        facet: Facet,
        include: String,
    },

    #[error("{path}: include '{facet}' target does not exist: {target}")]
    #[diagnostic(code(sinth::includes::missing_target))]
    MissingIncludeTarget {
        path: String,
        facet: Facet,
        target: String,
    },

    #[error("{path}: include key '{key}' points to {target} which declares facet '{found}'")]
    #[diagnostic(code(sinth::includes::facet_mismatch))]
    IncludeFacetMismatch {
        path: String,
        key: Facet,
        target: String,
        found: Facet,
    },

    #[error("{path}: entry file must declare facet 'intent', found '{found}'")]
    #[diagnostic(code(sinth::package::entry_facet))]
    EntryFacet { path: String, found: Facet },

    #[error("duplicate identity '{identity}' declared by {first} and {second}")]
    #[diagnostic(code(sinth::package::duplicate_identity))]
    DuplicateIdentity {
        identity: String,
        first: String,
        second: String,
    },

    #[error("package '{package}': multiple intent files: {}", .paths.join(", "))]
    #[diagnostic(code(sinth::package::multiple_entries))]
    MultipleEntries { package: String, paths: Vec<String> },

    #[error("package '{package}': expected single intent file {expected}, found {}", found_list(.found))]
    #[diagnostic(code(sinth::package::entry_not_unique))]
    EntryNotUnique {
        package: String,
        expected: String,
        found: Vec<String>,
    },

    #[error("stale package.json manifests must be removed: {}", .paths.join(", "))]
    #[diagnostic(code(sinth::registry::stale_manifest))]
    StaleManifest { paths: Vec<String> },

    #[error("missing registry index: {path}")]
    #[diagnostic(code(sinth::index::not_found))]
    IndexNotFound { path: String },

    #[error("{path}: invalid JSON ({message})")]
    #[diagnostic(code(sinth::index::json))]
    IndexJson { path: String, message: String },

    #[error("{path}: {message}")]
    #[diagnostic(code(sinth::index::schema))]
    IndexSchema { path: String, message: String },

    #[error("missing directory: {path}")]
    #[diagnostic(code(sinth::registry::packages_dir))]
    PackagesDirNotFound { path: String },

    #[error(
        "registry index and package directories differ: missing in index: [{}]; missing on disk: [{}]",
        .missing_in_index.join(", "),
        .missing_on_disk.join(", ")
    )]
    #[diagnostic(code(sinth::registry::index_mismatch))]
    PackageIndexMismatch {
        missing_in_index: Vec<String>,
        missing_on_disk: Vec<String>,
    },

    #[error("package '{package}': entry '{entry}' must start with '{expected_prefix}'")]
    #[diagnostic(code(sinth::registry::entry_prefix))]
    EntryPathPrefix {
        package: String,
        entry: String,
        expected_prefix: String,
    },

    #[error("package '{package}': entry file does not exist: {entry}")]
    #[diagnostic(code(sinth::registry::missing_entry))]
    MissingEntryFile { package: String, entry: String },

    #[error("{path}: {message}")]
    #[diagnostic(code(sinth::io))]
    Io { path: String, message: String },
}

fn found_list(found: &[String]) -> String {
    if found.is_empty() {
        "none".to_string()
    } else {
        found.join(", ")
    }
}

impl ValidationError {
    /// Attach a path to a header parse failure.
    pub fn from_header(path: &str, err: HeaderError) -> Self {
        match err {
            HeaderError::LegacyToken(token) => ValidationError::LegacyToken {
                path: path.to_string(),
                token: token.to_string(),
            },
            HeaderError::Grammar { reason } => ValidationError::HeaderGrammar {
                path: path.to_string(),
                reason,
            },
        }
    }

    /// Attach a path to an identity derivation failure.
    pub fn from_path(path: &str, err: PathError) -> Self {
        ValidationError::InvalidPath {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }

    /// Attach a path to an includes block parse failure.
    pub fn from_includes(path: &str, err: IncludesError) -> Self {
        let path = path.to_string();
        match err {
            IncludesError::MultipleBlocks { line } => {
                ValidationError::MultipleIncludesBlock { path, line }
            }
            IncludesError::MalformedDeclaration { line } => {
                ValidationError::MalformedIncludesDeclaration { path, line }
            }
            IncludesError::MalformedEntry { line, text, reason } => {
                ValidationError::MalformedIncludesEntry {
                    path,
                    line,
                    text,
                    reason,
                }
            }
            IncludesError::DuplicateKey { line, facet } => {
                ValidationError::DuplicateIncludeKey { path, line, facet }
            }
            IncludesError::Unterminated { line } => {
                ValidationError::UnterminatedIncludesBlock { path, line }
            }
            IncludesError::EmptyBlock { line } => ValidationError::EmptyIncludesBlock { path, line },
        }
    }

    /// Wrap an I/O failure on a path.
    pub fn io(path: &str, err: &std::io::Error) -> Self {
        ValidationError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Stable rule identifier (the miette code).
    pub fn rule(&self) -> String {
        MietteDiagnostic::code(self)
            .map(|c| c.to_string())
            .unwrap_or_default()
    }

    /// The file this violation is about, if it concerns a single file.
    pub fn file(&self) -> Option<&str> {
        match self {
            ValidationError::LegacyToken { path, .. }
            | ValidationError::HeaderGrammar { path, .. }
            | ValidationError::InvalidPath { path, .. }
            | ValidationError::IdentityMismatch { path, .. }
            | ValidationError::PackageMismatch { path, .. }
            | ValidationError::MultipleIncludesBlock { path, .. }
            | ValidationError::MalformedIncludesDeclaration { path, .. }
            | ValidationError::MalformedIncludesEntry { path, .. }
            | ValidationError::DuplicateIncludeKey { path, .. }
            | ValidationError::UnterminatedIncludesBlock { path, .. }
            | ValidationError::EmptyIncludesBlock { path, .. }
            | ValidationError::AbsolutePath { path, .. }
            | ValidationError::PathTraversal { path, .. }
            | ValidationError::WrongExtension { path, .. }
            | ValidationError::SelfInclude { path, .. }
            | ValidationError::MissingIncludeTarget { path, .. }
            | ValidationError::IncludeFacetMismatch { path, .. }
            | ValidationError::EntryFacet { path, .. }
            | ValidationError::IndexNotFound { path }
            | ValidationError::IndexJson { path, .. }
            | ValidationError::IndexSchema { path, .. }
            | ValidationError::Io { path, .. } => Some(path.as_str()),
            ValidationError::DuplicateIdentity { second, .. } => Some(second.as_str()),
            ValidationError::MissingEntryFile { entry, .. } => Some(entry.as_str()),
            _ => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());
        if let Some(file) = self.file() {
            diag = diag.with_location(file);
        }
        match self {
            ValidationError::LegacyToken { .. } => {
                diag.with_suggestion(suggestions::LEGACY_METADATA)
            }

            ValidationError::HeaderGrammar { .. } => diag.with_suggestion(suggestions::HEADER_FORMAT),

            ValidationError::InvalidPath { .. } => diag
                .with_context("flat layout: <feature>[.<facet>].intent")
                .with_context("nested layout: <feature dirs>/<facet>.intent"),

            ValidationError::IdentityMismatch { derived, .. } => diag
                .with_suggestion(format!("Change the header to `AIM: {}@<version>`", derived))
                .with_suggestion("Or move the file to the path its header implies"),

            ValidationError::PackageMismatch { field, expected, .. } => diag.with_suggestion(
                format!("Every file in the package must declare {} '{}'", field, expected),
            ),

            ValidationError::MalformedIncludesEntry { .. }
            | ValidationError::MalformedIncludesDeclaration { .. } => diag.with_context(
                "expected `INCLUDES {`, then one `<facet>: \"<path>.intent\"` per line, then `}`",
            ),

            ValidationError::IncludeFacetMismatch { key, target, .. } => diag.with_suggestion(
                format!("Point '{}' at a file declaring facet '{}', or fix {}", key, key, target),
            ),

            ValidationError::DuplicateIdentity { .. } => {
                diag.with_suggestion("Remove one of the files; each facet may appear once per package")
            }

            ValidationError::MultipleEntries { .. } | ValidationError::EntryNotUnique { .. } => diag
                .with_suggestion("Keep exactly one intent file and reference it as the index `entry`"),

            ValidationError::StaleManifest { .. } => {
                diag.with_suggestion("Package metadata now lives in registry/index.json")
            }

            ValidationError::IndexNotFound { .. } | ValidationError::PackagesDirNotFound { .. } => {
                diag.with_suggestion(suggestions::NO_REGISTRY)
            }

            ValidationError::PackageIndexMismatch {
                missing_in_index,
                missing_on_disk,
            } => {
                let mut diag = diag;
                for name in missing_in_index {
                    diag = diag.with_context(format!("directory '{}' has no index entry", name));
                }
                for name in missing_on_disk {
                    diag = diag.with_context(format!("index entry '{}' has no directory", name));
                }
                diag.with_suggestion(suggestions::SYNC_INDEX)
            }

            _ => diag,
        }
    }
}
