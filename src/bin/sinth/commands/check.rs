//! `sinth check` command
//!
//! Validates individual source files outside a registry: legacy tokens,
//! the line-1 header and the identity implied by the file's path.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::CheckArgs;
use sinth::core::{FeatureName, Version};
use sinth::ops::validate::{validate_source, Expected};
use sinth::util::diagnostic::emit;
use sinth::util::fs::{display_path, relative_path};
use sinth::util::GlobalContext;

pub fn execute(args: CheckArgs, ctx: &GlobalContext) -> Result<()> {
    let expected_values = match (&args.feature, &args.version) {
        (Some(feature), Some(version)) => Some((
            FeatureName::parse(feature).with_context(|| format!("invalid --feature: {}", feature))?,
            Version::parse(version).with_context(|| format!("invalid --version: {}", version))?,
        )),
        _ => None,
    };
    let expected = expected_values.as_ref().map(|(feature, version)| Expected {
        feature,
        version,
    });

    let root = args.root.as_ref().map(|r| ctx.cwd().join(r));
    let mut failed = 0usize;

    for file in &args.files {
        let path = ctx.cwd().join(file);
        let display = display_path(ctx.cwd(), &path);

        let base = match &root {
            Some(root) => root.as_path(),
            None => path.parent().unwrap_or(Path::new("")),
        };
        let relative = relative_path(base, &path);

        match validate_source(&path, &relative, &display, expected) {
            Ok(identity) => println!("[OK] {} ({})", display, identity),
            Err(e) => {
                failed += 1;
                println!("[FAIL] {}", e);
                if ctx.is_verbose() {
                    emit(&e.to_diagnostic(), ctx.color());
                }
            }
        }
    }

    tracing::debug!("{} file(s) checked, {} failed", args.files.len(), failed);

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
