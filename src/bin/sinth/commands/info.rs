//! `sinth info` command

use anyhow::Result;

use crate::cli::InfoArgs;
use sinth::ops::package_details;
use sinth::util::GlobalContext;

pub fn execute(args: InfoArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.registry_root(args.root.as_deref());
    let details = package_details(&root, &args.package)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    let summary = &details.summary;
    println!("{} v{}", summary.name, summary.version);
    println!("  entry:   {}", summary.entry);
    if !summary.entry_exists {
        println!("           (missing on disk)");
    } else if let Some(header) = &summary.header {
        println!("  header:  {}", header);
    }

    println!("\nSource files:");
    if details.sources.is_empty() {
        println!("  (none)");
    }
    for source in &details.sources {
        match (&source.identity, &source.error) {
            (Some(identity), _) => println!("  {}  {}", source.path, identity),
            (None, Some(error)) => println!("  {}  [FAIL] {}", source.path, error),
            (None, None) => println!("  {}", source.path),
        }
    }

    println!("\nIncludes:");
    if let Some(error) = &details.includes_error {
        println!("  [FAIL] {}", error);
    } else if details.includes.is_empty() {
        println!("  (none)");
    }
    for include in &details.includes {
        println!("  {}: {}", include.facet, include.path);
    }

    Ok(())
}
