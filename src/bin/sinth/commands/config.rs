//! `sinth config` command

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::{ConfigArgs, ConfigCommand};
use sinth::util::config::project_config_path;
use sinth::util::GlobalContext;

pub fn execute(args: ConfigArgs, ctx: &GlobalContext) -> Result<()> {
    match args.command {
        ConfigCommand::List => list(ctx),
        ConfigCommand::Get { key } => get(ctx, &key),
    }
}

fn list(ctx: &GlobalContext) -> Result<()> {
    match ctx.global_config() {
        Some(path) => println!("global:  {}{}", path.display(), status(path)),
        None => println!("global:  (no home directory)"),
    }
    let project = project_config_path(ctx.cwd());
    println!("project: {}{}", project.display(), status(&project));
    println!();

    let merged = toml::to_string_pretty(&ctx.config()).context("failed to serialize config")?;
    print!("{}", merged);
    Ok(())
}

fn get(ctx: &GlobalContext, key: &str) -> Result<()> {
    match ctx.config().get(key)? {
        Some(toml::Value::String(s)) => println!("{}", s),
        Some(value) => println!("{}", value),
        None => bail!("config key '{}' is not set", key),
    }
    Ok(())
}

fn status(path: &Path) -> &'static str {
    if path.is_file() {
        ""
    } else {
        " (not found)"
    }
}
