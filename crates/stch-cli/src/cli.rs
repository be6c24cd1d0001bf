use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stch_types::Dialect;

#[derive(Parser)]
#[command(
    name = "stch",
    about = "Read, write and convert legacy Scratch 1.4 and BYOB 3.1.1 project files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize a project file
    Inspect(InspectArgs),
    /// Write a default project
    New(NewArgs),
    /// Re-encode a project under another dialect
    Convert(ConvertArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct NewArgs {
    pub file: PathBuf,

    /// scratch14 or byob311
    #[arg(long, default_value = "scratch14")]
    pub dialect: Dialect,

    /// TOML file with project metadata
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Target dialect
    #[arg(long)]
    pub dialect: Dialect,
}
