use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stree",
    about = "Structural diff for StateTree assets",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two state tree files
    Diff(DiffArgs),
    /// Print the state hierarchy of a tree file
    Show(ShowArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Old tree (side A)
    pub left: PathBuf,
    /// New tree (side B)
    pub right: PathBuf,
    /// TOML diff configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Name for side A in messages (defaults to the file name)
    #[arg(long)]
    pub left_label: Option<String>,
    /// Name for side B in messages (defaults to the file name)
    #[arg(long)]
    pub right_label: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub tree: PathBuf,
}
