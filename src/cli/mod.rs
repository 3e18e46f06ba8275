//! CLI argument parsing for mdxgen.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mdxgen: generate a source tree from an MDX prompt document.
///
/// The prompt is cleaned of non-code directive markup, sent to an LLM
/// completion API, and every fenced code block of the response becomes a
/// file in the output directory.
#[derive(Parser, Debug)]
#[command(name = "mdxgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for mdxgen.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline: resolve, clean, generate, extract, validate.
    Generate(GenerateArgs),

    /// Extract fenced code blocks from a saved model response.
    ///
    /// The output directory is recreated empty first.
    Extract(ExtractArgs),

    /// Print an MDX document with directive markup removed.
    Clean(CleanArgs),

    /// Validate an existing output tree.
    Validate(ValidateArgs),

    /// Write a commented mdxgen.yaml template to the current directory.
    Init,
}

/// Arguments for the `generate` command.
#[derive(Parser, Debug, Default)]
pub struct GenerateArgs {
    /// Config file (default: ./mdxgen.yaml if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Prompt source: an http(s) URL or a local file. Overrides `prompt_source`.
    #[arg(long)]
    pub source: Option<String>,

    /// Output directory (default: <output_base>/<run id>).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Paths that must exist in the generated tree. Added to `required_paths`.
    #[arg(long, value_delimiter = ',')]
    pub require: Vec<String>,

    /// Run the configured type check after extraction.
    #[arg(long)]
    pub type_check: bool,

    /// Maximum generation attempts.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-attempt timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Model id.
    #[arg(long)]
    pub model: Option<String>,
}

/// Arguments for the `extract` command.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// File containing the raw model response.
    pub response_file: PathBuf,

    /// Directory to write extracted files into.
    #[arg(long)]
    pub out: PathBuf,
}

/// Arguments for the `clean` command.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// MDX document to clean.
    pub file: PathBuf,

    /// Config file supplying the reasoning tag and component list.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Tree to validate.
    pub dir: PathBuf,

    /// Paths that must exist. Added to `required_paths` from the config.
    #[arg(long, value_delimiter = ',')]
    pub require: Vec<String>,

    /// Run the configured type check.
    #[arg(long)]
    pub type_check: bool,

    /// Config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
