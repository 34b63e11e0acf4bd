use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;

use verify_rss::{
    Cli, Config, ConfigManager, FileDiscovery, FileValidationResult, Output, ProgressCallback,
    ValidationEngine, VerbosityLevel,
};

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbosity: VerbosityLevel) {
    let default_level = match verbosity {
        VerbosityLevel::Quiet | VerbosityLevel::Normal => "verify_rss=error",
        VerbosityLevel::Verbose => "verify_rss=debug",
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run discovery and validation, print the report, and say whether every file passed.
async fn run(cli: &Cli, config: &Config, file_discovery: &FileDiscovery) -> anyhow::Result<bool> {
    let output = Arc::new(Output::new(config.verbosity(), config.output_format()));
    let engine = ValidationEngine::new(config.validation_config());

    let progress = output.streams_file_results().then(|| {
        let output = Arc::clone(&output);
        Arc::new(move |result: &FileValidationResult| {
            if let Some(line) = output.format_file_result(result) {
                println!("{}", line);
            }
        }) as ProgressCallback
    });

    let results = engine
        .validate_path_with_progress(&cli.path, file_discovery, progress)
        .await
        .context("Error walking the path")?;

    let report = output.format_results(&results);
    if !report.is_empty() {
        print!("{}", report);
        if !report.ends_with('\n') {
            println!();
        }
    }

    Ok(!results.has_failures())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };
    init_tracing(config.verbosity());

    let file_discovery = match config.file_discovery() {
        Ok(discovery) => discovery,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    match run(&cli, &config, &file_discovery).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
