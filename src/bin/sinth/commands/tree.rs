//! `sinth tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use sinth::ops::{format_include_tree, package_details};
use sinth::util::GlobalContext;

pub fn execute(args: TreeArgs, ctx: &GlobalContext) -> Result<()> {
    let root = ctx.registry_root(args.root.as_deref());
    let details = package_details(&root, &args.package)?;

    print!("{}", format_include_tree(&root, &details));

    Ok(())
}
