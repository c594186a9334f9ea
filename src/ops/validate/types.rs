//! Public types and enums for the validate module.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::core::includes::IncludeEntry;
use crate::core::SourceIdentity;

use super::errors::ValidationError;

/// Output format for validation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `[OK]` / `[FAIL]` lines (default)
    #[default]
    Human,
    /// Machine-readable JSON report
    Json,
    /// GitHub Actions annotations with job summary
    Github,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "github" | "github-actions" | "gha" => Ok(OutputFormat::Github),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone)]
pub struct OutputFormatParseError(pub String);

impl std::fmt::Display for OutputFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid output format '{}', valid values: human, json, github",
            self.0
        )
    }
}

impl std::error::Error for OutputFormatParseError {}

/// Options for a registry validation run.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Registry root (the directory containing `registry/`)
    pub root: PathBuf,

    /// Stop at the first violation
    pub fail_fast: bool,

    /// Number of packages checked in parallel (None = rayon default)
    pub jobs: Option<usize>,
}

impl ValidateOptions {
    /// Create options for a registry root.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        ValidateOptions {
            root: root.into(),
            fail_fast: false,
            jobs: None,
        }
    }
}

/// A validated include: key, declared path and the identity found there.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedInclude {
    #[serde(flatten)]
    pub entry: IncludeEntry,
    /// Root-relative display path of the target
    pub target: String,
    pub identity: SourceIdentity,
}

/// Result of checking one index package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    /// Package name
    pub name: String,

    /// Version declared by the index
    pub version: String,

    /// Entry path declared by the index
    pub entry: String,

    /// Number of source files that passed validation
    pub files_validated: usize,

    /// Includes declared by the entry file that resolved cleanly
    pub includes: Vec<ResolvedInclude>,

    /// Violations found in this package, in check order
    #[serde(serialize_with = "serialize_violations")]
    pub violations: Vec<ValidationError>,

    /// Outcome recorded when the package joined a report; survives fail-fast
    /// truncation of `violations`
    #[serde(rename = "passed")]
    recorded_pass: bool,
}

impl PackageReport {
    pub fn new(name: impl Into<String>, version: impl Into<String>, entry: impl Into<String>) -> Self {
        PackageReport {
            name: name.into(),
            version: version.into(),
            entry: entry.into(),
            files_validated: 0,
            includes: Vec::new(),
            violations: Vec::new(),
            recorded_pass: true,
        }
    }

    /// Whether the package had no violations.
    pub fn passed(&self) -> bool {
        self.recorded_pass && self.violations.is_empty()
    }
}

/// Complete validation result for a registry.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Registry root that was validated
    pub root: PathBuf,

    /// Index format version, when the index could be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_version: Option<String>,

    /// Registry-wide violations (index, stale manifests, index/disk sets)
    #[serde(serialize_with = "serialize_violations")]
    pub registry_violations: Vec<ValidationError>,

    /// Per-package results, in index order
    pub packages: Vec<PackageReport>,

    /// Total validation time (in milliseconds for JSON)
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,

    /// Whether validation passed overall
    pub passed: bool,
}

impl ValidationReport {
    /// Create an empty report for a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ValidationReport {
            root: root.into(),
            index_version: None,
            registry_violations: Vec::new(),
            packages: Vec::new(),
            duration: Duration::ZERO,
            passed: true,
        }
    }

    /// Record a registry-wide violation.
    pub fn add_violation(&mut self, violation: ValidationError) {
        self.passed = false;
        self.registry_violations.push(violation);
    }

    /// Record a package result.
    pub fn add_package(&mut self, mut package: PackageReport) {
        package.recorded_pass = package.passed();
        if !package.recorded_pass {
            self.passed = false;
        }
        self.packages.push(package);
    }

    /// All violations in report order: registry-wide first, then packages
    /// in index order.
    pub fn violations(&self) -> impl Iterator<Item = &ValidationError> {
        self.registry_violations
            .iter()
            .chain(self.packages.iter().flat_map(|p| p.violations.iter()))
    }

    /// Number of violations.
    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    /// Number of packages that validated without violations.
    pub fn validated_count(&self) -> usize {
        self.packages.iter().filter(|p| p.passed()).count()
    }

    /// Drop everything after the first violation.
    ///
    /// Package outcomes are kept, so counts still reflect every package.
    pub fn keep_first_violation(&mut self) {
        if !self.registry_violations.is_empty() {
            self.registry_violations.truncate(1);
            for pkg in &mut self.packages {
                pkg.violations.clear();
            }
            return;
        }

        let mut found = false;
        for pkg in &mut self.packages {
            if found {
                pkg.violations.clear();
            } else if !pkg.violations.is_empty() {
                pkg.violations.truncate(1);
                found = true;
            }
        }
    }
}

/// JSON shape of one violation.
#[derive(Serialize)]
struct ViolationRecord<'a> {
    rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    message: String,
}

fn serialize_violations<S>(violations: &[ValidationError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(violations.iter().map(|v| ViolationRecord {
        rule: v.rule(),
        file: v.file(),
        message: v.to_string(),
    }))
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
