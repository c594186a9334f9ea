//! `sinth list` command

use anyhow::Result;

use crate::cli::ListArgs;
use sinth::ops::list_packages;
use sinth::util::GlobalContext;

pub fn execute(args: ListArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.registry_root(args.root.as_deref());
    let packages = list_packages(&root)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    println!(
        "{} package{} in {}:\n",
        packages.len(),
        if packages.len() == 1 { "" } else { "s" },
        root.display()
    );

    for pkg in &packages {
        let status = if pkg.entry_exists { "" } else { " (entry missing)" };
        println!("  {} v{}  {}{}", pkg.name, pkg.version, pkg.entry, status);
    }

    Ok(())
}
