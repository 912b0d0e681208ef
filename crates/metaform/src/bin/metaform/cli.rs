//! metaform cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; metaform ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a manifest into a terraform file
    ///
    /// Reads the manifest from stdin unless --manifest is given
    Build(BuildCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct BuildCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load the manifest from a file
    ///
    /// The format follows the extension (.json is JSON, anything else YAML)
    #[clap(short = 'f', long = "manifest")]
    pub manifest: Option<PathBuf>,

    /// Format of a manifest read from stdin
    #[arg(long = "input-format", default_value_t)]
    pub format: InputFormat,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    /// Output name, defaults to the manifest's file stem
    #[clap(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Write into <name>/main.tf instead of <name>.tf
    #[clap(short = 'i', long = "isolate")]
    pub isolate: bool,

    /// Print the document instead of writing a file
    #[clap(long = "stdout", conflicts_with("isolate"))]
    pub stdout: bool,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum InputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Json => f.write_str("json"),
            InputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl From<InputFormat> for metaform::manifest::Format {
    fn from(value: InputFormat) -> Self {
        match value {
            InputFormat::Json => metaform::manifest::Format::Json,
            InputFormat::Yaml => metaform::manifest::Format::Yaml,
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Dependency layers
    Layers,
    /// Registered blocks and their dependencies
    Blocks,
}
