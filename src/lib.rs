//! # verify-rss Library
//!
//! Checks RSS feed files for well-formed XML, strict RFC 1123 publication
//! dates with a matching day of week, unique item GUIDs, and a channel date
//! that agrees with its latest item.

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod feed;
pub mod file_discovery;
pub mod output;
pub mod rules;
pub mod validator;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use date::{DateError, format_date, parse_date, validate_date};
pub use error::VerifyError;
pub use feed::{FeedDocument, FeedItem, FeedParseError, parse_feed};
pub use file_discovery::FileDiscovery;
pub use output::Output;
pub use rules::{Rule, ValidationError, ViolationKind};
pub use validator::{
    FileValidationResult, ProgressCallback, ValidationConfig, ValidationEngine, ValidationResult,
    ValidationResults, ValidationStatus, Violation, validate_document,
};
