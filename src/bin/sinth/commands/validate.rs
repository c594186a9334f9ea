//! `sinth validate` command

use anyhow::{Context, Result};

use crate::cli::ValidateArgs;
use sinth::ops::validate::{
    format_report_for_output, validate_registry, OutputFormat, ValidateOptions,
};
use sinth::util::GlobalContext;

pub fn execute(args: ValidateArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.registry_root(args.root.as_deref());
    let config = ctx.config_for(&root);

    let output_format: OutputFormat = match args.format {
        Some(format) => format
            .parse()
            .with_context(|| format!("invalid output format: {}", format))?,
        None => config.output_format().unwrap_or_default(),
    };

    let options = ValidateOptions {
        root,
        fail_fast: args.fail_fast || config.validate.fail_fast,
        jobs: args.jobs.or(config.validate.jobs),
    };

    let report = validate_registry(&options);

    let output = format_report_for_output(&report, output_format, ctx.is_verbose());
    print!("{}", output);

    // Exit with error code if validation failed
    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}
