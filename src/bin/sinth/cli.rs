//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// sinth - Validate AIM source registries
#[derive(Parser)]
#[command(name = "sinth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a registry (index, packages, headers and includes)
    Validate(ValidateArgs),

    /// Validate standalone source files
    Check(CheckArgs),

    /// List the packages in the registry index
    List(ListArgs),

    /// Show one package: entry, source files and includes
    Info(InfoArgs),

    /// Display the include tree of a package's entry file
    Tree(TreeArgs),

    /// Show the merged configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Registry root (the directory containing `registry/`)
    pub root: Option<PathBuf>,

    /// Stop at the first violation
    #[arg(long)]
    pub fail_fast: bool,

    /// Number of packages checked in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format: human, json, github
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Source files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory paths are derived from (defaults to each file's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Feature every file must declare
    #[arg(long, requires = "version")]
    pub feature: Option<String>,

    /// Version every file must declare
    #[arg(long, requires = "feature")]
    pub version: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Registry root
    pub root: Option<PathBuf>,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package name
    pub package: String,

    /// Registry root
    pub root: Option<PathBuf>,

    /// Print the details as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Package name
    pub package: String,

    /// Registry root
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// List config file locations and the merged values
    List,

    /// Print one value, e.g. `validate.format`
    Get {
        /// Dotted config key
        key: String,
    },
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
