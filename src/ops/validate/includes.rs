//! Include graph resolution for an entry file.

use std::path::{Component, Path, PathBuf};

use crate::core::includes::{parse_includes, IncludeEntry};
use crate::core::package::is_source_file;

use super::errors::ValidationError;
use super::source::SourceCache;
use super::types::ResolvedInclude;

/// Resolve and validate every include declared by an entry file.
///
/// Paths are resolved relative to the entry file's directory. Each entry is
/// checked independently; the ones that pass every check are returned.
pub fn resolve_includes(
    entry_path: &Path,
    content: &str,
    cache: &mut SourceCache<'_>,
    violations: &mut Vec<ValidationError>,
) -> Vec<ResolvedInclude> {
    let display = cache.display(entry_path);
    let entries = match parse_includes(content) {
        Ok(entries) => entries,
        Err(e) => {
            violations.push(ValidationError::from_includes(&display, e));
            return Vec::new();
        }
    };

    let mut resolved = Vec::new();

    for entry in entries {
        if let Some(include) = resolve_one(entry_path, &display, entry, cache, violations) {
            resolved.push(include);
        }
    }

    resolved
}

fn resolve_one(
    entry_path: &Path,
    display: &str,
    entry: IncludeEntry,
    cache: &mut SourceCache<'_>,
    violations: &mut Vec<ValidationError>,
) -> Option<ResolvedInclude> {
    if is_absolute(&entry.path) {
        violations.push(ValidationError::AbsolutePath {
            path: display.to_string(),
            facet: entry.facet,
            include: entry.path,
        });
        return None;
    }

    if has_traversal(&entry.path) {
        violations.push(ValidationError::PathTraversal {
            path: display.to_string(),
            facet: entry.facet,
            include: entry.path,
        });
        return None;
    }

    if !is_source_file(Path::new(&entry.path)) {
        violations.push(ValidationError::WrongExtension {
            path: display.to_string(),
            facet: entry.facet,
            include: entry.path,
        });
        return None;
    }

    let base = entry_path.parent().unwrap_or(Path::new(""));
    let target = join_relative(base, &entry.path);
    let target_display = cache.display(&target);
    if !target.is_file() {
        violations.push(ValidationError::MissingIncludeTarget {
            path: display.to_string(),
            facet: entry.facet,
            target: target_display,
        });
        return None;
    }

    if target == entry_path {
        violations.push(ValidationError::SelfInclude {
            path: display.to_string(),
            facet: entry.facet,
        });
        return None;
    }

    let identity = cache.check(&target, violations)?;
    if identity.facet != entry.facet {
        violations.push(ValidationError::IncludeFacetMismatch {
            path: display.to_string(),
            key: entry.facet,
            target: target_display,
            found: identity.facet,
        });
        return None;
    }

    Some(ResolvedInclude {
        entry,
        target: target_display,
        identity,
    })
}

fn is_absolute(path: &str) -> bool {
    let p = Path::new(path);
    p.is_absolute()
        || p.has_root()
        || path.starts_with('/')
        || path.starts_with('\\')
        || matches!(p.components().next(), Some(Component::Prefix(_)))
}

fn has_traversal(path: &str) -> bool {
    path.split(['/', '\\']).any(|seg| seg == "..")
}

/// Join a `/`-separated relative path onto `base`, dropping `.` segments.
fn join_relative(base: &Path, rel: &str) -> PathBuf {
    rel.split(['/', '\\'])
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .fold(base.to_path_buf(), |acc, seg| acc.join(seg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::facet::{Facet, FeatureName, Version};
    use crate::core::registry::RegistryLayout;
    use crate::ops::validate::source::Expected;
    use std::fs;
    use tempfile::TempDir;

    struct Setup {
        _tmp: TempDir,
        layout: RegistryLayout,
        pkg_root: PathBuf,
        feature: FeatureName,
        version: Version,
    }

    fn setup(files: &[(&str, &str)]) -> Setup {
        let tmp = TempDir::new().unwrap();
        let layout = RegistryLayout::new(tmp.path());
        let pkg_root = layout.package_dir("weather");
        fs::create_dir_all(&pkg_root).unwrap();
        for (rel, content) in files {
            let path = pkg_root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Setup {
            _tmp: tmp,
            layout,
            pkg_root,
            feature: FeatureName::parse("weather").unwrap(),
            version: Version::parse("1.0").unwrap(),
        }
    }

    fn run(setup: &Setup, entry_content: &str) -> (Vec<ResolvedInclude>, Vec<ValidationError>) {
        let mut cache = SourceCache::new(
            &setup.layout,
            &setup.pkg_root,
            Expected {
                feature: &setup.feature,
                version: &setup.version,
            },
        );
        let mut violations = Vec::new();
        let entry = setup.pkg_root.join("weather.intent");
        let resolved = resolve_includes(&entry, entry_content, &mut cache, &mut violations);
        (resolved, violations)
    }

    const ENTRY_HEAD: &str = "AIM: weather#intent@1.0\n";

    #[test]
    fn test_resolves_matching_facet() {
        let s = setup(&[("weather.schema.intent", "AIM: weather#schema@1.0\n")]);
        let content = format!("{}INCLUDES {{\n  schema: \"weather.schema.intent\"\n}}\n", ENTRY_HEAD);
        let (resolved, violations) = run(&s, &content);

        assert!(violations.is_empty(), "{:?}", violations);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].identity.facet, Facet::Schema);
        assert_eq!(
            resolved[0].target,
            "registry/packages/weather/weather.schema.intent"
        );
    }

    #[test]
    fn test_facet_mismatch() {
        let s = setup(&[("weather.schema.intent", "AIM: weather#schema@1.0\n")]);
        let content = format!("{}INCLUDES {{\n  flow: \"weather.schema.intent\"\n}}\n", ENTRY_HEAD);
        let (resolved, violations) = run(&s, &content);

        assert!(resolved.is_empty());
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            ValidationError::IncludeFacetMismatch {
                key: Facet::Flow,
                found: Facet::Schema,
                ..
            }
        ));
    }

    #[test]
    fn test_traversal_reported_before_extension() {
        let s = setup(&[]);
        let content = format!("{}INCLUDES {{\n  schema: \"../x\"\n}}\n", ENTRY_HEAD);
        let (_, violations) = run(&s, &content);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], ValidationError::PathTraversal { .. }));
    }

    #[test]
    fn test_path_checks() {
        let s = setup(&[]);
        let content = format!(
            "{}INCLUDES {{\n  schema: \"/abs/weather.schema.intent\"\n  flow: \"weather.flow.txt\"\n  view: \"weather.view.intent\"\n}}\n",
            ENTRY_HEAD
        );
        let (_, violations) = run(&s, &content);
        let rules: Vec<String> = violations.iter().map(|v| v.rule()).collect();
        assert_eq!(
            rules,
            [
                "sinth::includes::absolute_path",
                "sinth::includes::wrong_extension",
                "sinth::includes::missing_target",
            ]
        );
    }

    #[test]
    fn test_event_and_mapping_are_valid_keys() {
        let s = setup(&[
            ("weather.event.intent", "AIM: weather#event@1.0\n"),
            ("weather/mapping.intent", "AIM: weather#mapping@1.0\n"),
        ]);
        let content = format!(
            "{}INCLUDES {{\n  event: \"weather.event.intent\"\n  mapping: \"./weather/mapping.intent\"\n}}\n",
            ENTRY_HEAD
        );
        let (resolved, violations) = run(&s, &content);
        assert!(violations.is_empty(), "{:?}", violations);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_invalid_target_reported_once() {
        let s = setup(&[("weather.schema.intent", "AIM: weather#schema@9.9\n")]);
        let content = format!("{}INCLUDES {{\n  schema: \"weather.schema.intent\"\n}}\n", ENTRY_HEAD);
        let (resolved, violations) = run(&s, &content);
        assert!(resolved.is_empty());
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            ValidationError::PackageMismatch { field: "version", .. }
        ));
    }

    #[test]
    fn test_parse_error_stops_resolution() {
        let s = setup(&[]);
        let content = format!("{}INCLUDES {{\n}}\n", ENTRY_HEAD);
        let (resolved, violations) = run(&s, &content);
        assert!(resolved.is_empty());
        assert!(matches!(
            violations[0],
            ValidationError::EmptyIncludesBlock { line: 2, .. }
        ));
    }

    #[test]
    fn test_entry_including_itself() {
        let s = setup(&[("weather.intent", ENTRY_HEAD)]);
        let content = format!("{}INCLUDES {{\n  intent: \"./weather.intent\"\n}}\n", ENTRY_HEAD);
        let (resolved, violations) = run(&s, &content);
        assert!(resolved.is_empty());
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            ValidationError::SelfInclude {
                facet: Facet::Intent,
                ..
            }
        ));
    }

    #[test]
    fn test_no_block_is_fine() {
        let s = setup(&[]);
        let (resolved, violations) = run(&s, ENTRY_HEAD);
        assert!(resolved.is_empty());
        assert!(violations.is_empty());
    }
}
