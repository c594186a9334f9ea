//! Output formatting for validation reports (human/JSON/GitHub).

use std::fmt::Write as _;

use super::types::{OutputFormat, ValidationReport};

/// Format a report for the terminal.
///
/// Success is a single `[OK]` line. Failure is one `[FAIL]` line per
/// violation; with `verbose`, each is followed by its diagnostic context and
/// suggestions.
pub fn format_report(report: &ValidationReport, verbose: bool) -> String {
    let mut output = String::new();

    if report.passed {
        writeln!(
            output,
            "[OK] Validated {} package(s)",
            report.validated_count()
        )
        .unwrap();
        return output;
    }

    for violation in report.violations() {
        writeln!(output, "[FAIL] {}", violation).unwrap();

        if verbose {
            let diag = violation.to_diagnostic();
            for ctx in &diag.context {
                writeln!(output, "       {}", ctx).unwrap();
            }
            for suggestion in &diag.suggestions {
                writeln!(output, "       help: {}", suggestion).unwrap();
            }
        }
    }

    output
}

/// Format a report as JSON.
pub fn format_report_json(report: &ValidationReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e))
}

/// Format a report for GitHub Actions.
///
/// Outputs:
/// - one `::error::` annotation per violation, with `file=` when the
///   violation concerns a single file
/// - a job summary in markdown format
pub fn format_report_github_actions(report: &ValidationReport) -> String {
    let mut output = String::new();

    for violation in report.violations() {
        let message = escape_data(&violation.to_string());
        let title = escape_property(&violation.rule());
        match violation.file() {
            Some(file) => writeln!(
                output,
                "::error file={},title={}::{}",
                escape_property(file),
                title,
                message
            )
            .unwrap(),
            None => writeln!(output, "::error title={}::{}", title, message).unwrap(),
        }
    }

    writeln!(output, "::group::Validation Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Registry {}", report.root.display()).unwrap();
    writeln!(output).unwrap();

    if !report.packages.is_empty() {
        writeln!(output, "| Package | Version | Status | Violations |").unwrap();
        writeln!(output, "|---------|---------|--------|------------|").unwrap();
        for pkg in &report.packages {
            let status = if pkg.passed() {
                ":white_check_mark:"
            } else {
                ":x:"
            };
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                pkg.name,
                pkg.version,
                status,
                pkg.violations.len()
            )
            .unwrap();
        }
        writeln!(output).unwrap();
    }

    let overall_status = if report.passed { "PASSED" } else { "FAILED" };
    let overall_emoji = if report.passed {
        ":heavy_check_mark:"
    } else {
        ":x:"
    };
    writeln!(
        output,
        "**Result:** {} {} ({}/{} packages validated, {} violation(s))",
        overall_emoji,
        overall_status,
        report.validated_count(),
        report.packages.len(),
        report.violation_count()
    )
    .unwrap();
    writeln!(output, "**Total time:** {:.2?}", report.duration).unwrap();

    if !report.registry_violations.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "### Registry").unwrap();
        for violation in &report.registry_violations {
            writeln!(output, "- {}", violation).unwrap();
        }
    }

    writeln!(output, "::endgroup::").unwrap();

    output
}

/// Escape a workflow command message.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value; `:` and `,` end a property.
fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Format the report according to the specified output format.
pub fn format_report_for_output(
    report: &ValidationReport,
    format: OutputFormat,
    verbose: bool,
) -> String {
    match format {
        OutputFormat::Human => format_report(report, verbose),
        OutputFormat::Json => format_report_json(report),
        OutputFormat::Github => format_report_github_actions(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::validate::errors::ValidationError;
    use crate::ops::validate::types::PackageReport;

    fn failing_report() -> ValidationReport {
        let mut report = ValidationReport::new("/srv/aim");
        report.add_violation(ValidationError::PackageIndexMismatch {
            missing_in_index: vec!["c".into()],
            missing_on_disk: vec![],
        });
        let mut pkg = PackageReport::new("a", "1.0", "registry/packages/a/a.intent");
        pkg.violations.push(ValidationError::HeaderGrammar {
            path: "registry/packages/a/a.intent".into(),
            reason: "missing 'AIM:' prefix".into(),
        });
        report.add_package(pkg);
        report
    }

    #[test]
    fn test_human_success() {
        let mut report = ValidationReport::new("/srv/aim");
        report.add_package(PackageReport::new("weather", "1.0", "x"));
        assert_eq!(format_report(&report, false), "[OK] Validated 1 package(s)\n");
    }

    #[test]
    fn test_human_failure_lines() {
        let output = format_report(&failing_report(), false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[FAIL] registry index and package directories differ"));
        assert!(lines[1].starts_with("[FAIL] registry/packages/a/a.intent: first line"));
    }

    #[test]
    fn test_human_verbose_adds_help() {
        let output = format_report(&failing_report(), true);
        assert!(output.contains("directory 'c' has no index entry"));
        assert!(output.contains("help: Line 1 must read"));
    }

    #[test]
    fn test_github_annotations() {
        let output = format_report_github_actions(&failing_report());
        assert!(output.contains("::error title=sinth%3A%3Aregistry%3A%3Aindex_mismatch::"));
        assert!(output.contains(
            "::error file=registry/packages/a/a.intent,title=sinth%3A%3Aheader%3A%3Agrammar::"
        ));
        assert!(output.contains("| a | 1.0 | :x: | 1 |"));
        assert!(output.contains("FAILED"));
        assert!(output.trim_end().ends_with("::endgroup::"));
    }

    #[test]
    fn test_github_properties_end_at_first_separator() {
        let mut report = ValidationReport::new("/srv/aim");
        report.add_violation(ValidationError::StaleManifest {
            paths: vec!["registry/packages/a/package.json".into()],
        });
        let mut pkg = PackageReport::new("a", "1.0", "registry/packages/a/a,b.intent");
        pkg.violations.push(ValidationError::HeaderGrammar {
            path: "registry/packages/a/a,b.intent".into(),
            reason: "100% wrong".into(),
        });
        report.add_package(pkg);

        let output = format_report_github_actions(&report);
        let lines: Vec<&str> = output.lines().collect();

        let (props, message) = lines[0]
            .strip_prefix("::error ")
            .unwrap()
            .split_once("::")
            .unwrap();
        assert_eq!(props, "title=sinth%3A%3Aregistry%3A%3Astale_manifest");
        assert!(message.starts_with("stale package.json manifests"));

        let (props, message) = lines[1]
            .strip_prefix("::error ")
            .unwrap()
            .split_once("::")
            .unwrap();
        assert_eq!(
            props,
            "file=registry/packages/a/a%2Cb.intent,title=sinth%3A%3Aheader%3A%3Agrammar"
        );
        assert!(message.contains("100%25 wrong"));
    }

    #[test]
    fn test_json_output() {
        let output = format_report_json(&failing_report());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["packages"][0]["name"], "a");
        assert_eq!(
            value["packages"][0]["violations"][0]["file"],
            "registry/packages/a/a.intent"
        );
    }
}
