//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bedrock-query")]
#[command(author, version, about = "Search Minecraft Bedrock world records", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (default)
    #[arg(long, global = true, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output as YAML
    #[arg(long, global = true, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output as TOML
    #[arg(long, global = true, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Suppress progress and error messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.toml {
            OutputFormat::Toml
        } else {
            OutputFormat::Json
        }
    }

    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the records of a world dump
    Search(SearchArgs),

    /// Show how a search string splits into conditions and free text
    Parse(ParseArgs),

    /// Show the compiled query for a search string
    Explain(ExplainArgs),

    /// List screens with their filter keywords
    Screens,

    /// Show the content type and display key of a raw key
    Classify(ClassifyArgs),
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search query
    #[arg(allow_hyphen_values = true)]
    pub query: String,

    /// World dump (JSON lines of base64 key/value pairs)
    #[arg(long)]
    pub dump: PathBuf,

    /// Screen defining the searchable records and keywords
    #[arg(long)]
    pub screen: Option<String>,

    /// Maximum number of results to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Exit with code 4 when nothing matches
    #[arg(long)]
    pub fail_on_empty: bool,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Search query
    #[arg(allow_hyphen_values = true)]
    pub query: String,
}

#[derive(Parser, Debug)]
pub struct ExplainArgs {
    /// Search query
    #[arg(allow_hyphen_values = true)]
    pub query: String,

    /// Screen defining the keywords
    #[arg(long)]
    pub screen: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Raw database key, base64 encoded
    pub key: String,
}
