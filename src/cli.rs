use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only report failing files
    Quiet,
    /// One line per file plus a summary
    #[default]
    Normal,
    /// Add timings and violation kinds
    Verbose,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Human,
    /// A single JSON document
    Json,
}

/// Verify RSS feed files: well-formed XML, strict dates, unique GUIDs
#[derive(Parser, Debug, Clone)]
#[command(name = "verify-rss")]
#[command(about = "Verify RSS feed files: well-formed XML, strict RFC 1123 dates, unique GUIDs")]
#[command(version)]
pub struct Cli {
    /// Directory (searched recursively) or single file to verify
    #[arg(default_value = "feed")]
    pub path: PathBuf,

    /// File extensions to process (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        help = "File extensions to process (e.g., 'xml,rss')"
    )]
    pub extensions: Option<String>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Maximum directory depth below the root
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Follow symbolic links while walking
    #[arg(long = "follow-symlinks")]
    pub follow_symlinks: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Only report failures
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Stop after the first file that fails
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_deref().map(split_extensions)
    }
}

/// Split a comma-separated extension list, tolerating a leading dot
pub fn split_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
