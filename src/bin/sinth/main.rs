//! sinth CLI - Validate AIM source registries

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sinth::util::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("sinth=debug")
    } else {
        EnvFilter::new("sinth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    // Execute command
    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &ctx),
        Commands::Check(args) => commands::check::execute(args, &ctx),
        Commands::List(args) => commands::list::execute(args, &ctx),
        Commands::Info(args) => commands::info::execute(args, &ctx),
        Commands::Tree(args) => commands::tree::execute(args, &ctx),
        Commands::Config(args) => commands::config::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
