use crate::cli::{Cli, OutputFormat, VerbosityLevel, split_extensions};
use crate::file_discovery::FileDiscovery;
use crate::validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationSettings,
    pub output: OutputConfig,
    pub files: FileConfig,
}

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationSettings {
    /// Stop after the first failing file
    pub fail_fast: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormatConfig,
    pub verbose: bool,
    /// Quiet mode (failures only)
    pub quiet: bool,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// File name extensions to process
    pub extensions: Vec<String>,
    /// Include patterns (glob syntax)
    pub include_patterns: Vec<String>,
    /// Exclude patterns (glob syntax)
    pub exclude_patterns: Vec<String>,
    /// Maximum traversal depth below the root
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string(), "rss".to_string()],
            include_patterns: vec![],
            exclude_patterns: vec![],
            max_depth: None,
            follow_symlinks: false,
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format.into()
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            fail_fast: self.validation.fail_fast,
        }
    }

    /// Build the file discovery described by the `[files]` section
    pub fn file_discovery(&self) -> crate::error::Result<FileDiscovery> {
        FileDiscovery::new()
            .with_extensions(self.files.extensions.clone())
            .with_max_depth(self.files.max_depth)
            .with_follow_symlinks(self.files.follow_symlinks)
            .with_include_patterns(self.files.include_patterns.clone())?
            .with_exclude_patterns(self.files.exclude_patterns.clone())
    }
}

const CONFIG_FILE_NAMES: [&str; 4] = [
    "verify-rss.toml",
    "verify-rss.json",
    ".verify-rss.toml",
    ".verify-rss.json",
];

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(cli, &SystemEnvProvider).await
    }

    pub async fn load_config_with(cli: &Cli, env: &impl EnvProvider) -> Result<Config> {
        let mut config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path).await?
        } else {
            Self::find_config_file().await?.unwrap_or_default()
        };

        config = Self::apply_environment_overrides_with(env, config)?;
        config = Self::merge_with_cli(config, cli);
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find a configuration file in the current directory, then the user config directory
    pub async fn find_config_file() -> Result<Option<Config>> {
        for name in CONFIG_FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("verify-rss");
            for name in CONFIG_FILE_NAMES {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(fail_fast) = env.get("VERIFY_RSS_FAIL_FAST") {
            config.validation.fail_fast = parse_env("VERIFY_RSS_FAIL_FAST", &fail_fast)?;
        }

        if let Some(verbose) = env.get("VERIFY_RSS_VERBOSE") {
            config.output.verbose = parse_env("VERIFY_RSS_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("VERIFY_RSS_QUIET") {
            config.output.quiet = parse_env("VERIFY_RSS_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("VERIFY_RSS_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid VERIFY_RSS_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        if let Some(extensions) = env.get("VERIFY_RSS_EXTENSIONS") {
            config.files.extensions = split_extensions(&extensions);
        }

        if let Some(max_depth) = env.get("VERIFY_RSS_MAX_DEPTH") {
            config.files.max_depth = Some(parse_env("VERIFY_RSS_MAX_DEPTH", &max_depth)?);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence when given)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.fail_fast {
            config.validation.fail_fast = true;
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        if let Some(extensions) = cli.get_extensions() {
            config.files.extensions = extensions;
        }
        if !cli.include_patterns.is_empty() {
            config.files.include_patterns = cli.include_patterns.clone();
        }
        if !cli.exclude_patterns.is_empty() {
            config.files.exclude_patterns = cli.exclude_patterns.clone();
        }
        if cli.max_depth.is_some() {
            config.files.max_depth = cli.max_depth;
        }
        if cli.follow_symlinks {
            config.files.follow_symlinks = true;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if config.files.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one file extension must be specified".to_string(),
            ));
        }

        for ext in &config.files.extensions {
            if ext.contains('/') || ext.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "Invalid file extension: {}",
                    ext
                )));
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}
