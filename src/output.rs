//! Output and reporting
//!
//! Human-readable lines per file plus a run summary, or one JSON document.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::validator::{FileValidationResult, ValidationResults, ValidationStatus};

/// Formatter for validation results
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat) -> Self {
        Self {
            verbosity,
            format,
            show_colors: format == OutputFormat::Human && atty::is(atty::Stream::Stdout),
        }
    }

    /// Disable ANSI colours regardless of the terminal
    pub fn without_colors(mut self) -> Self {
        self.show_colors = false;
        self
    }

    /// Whether per-file lines are printed as files complete
    pub fn streams_file_results(&self) -> bool {
        self.format == OutputFormat::Human
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// The line(s) for one file, or `None` when this verbosity hides it
    pub fn format_file_result(&self, result: &FileValidationResult) -> Option<String> {
        if self.verbosity == VerbosityLevel::Quiet && result.passed() {
            return None;
        }

        let path_display = result.path.display();
        let timing = if self.verbosity >= VerbosityLevel::Verbose {
            format!(" ({})", format_duration(result.duration))
        } else {
            String::new()
        };

        let line = match &result.status {
            ValidationStatus::Valid => {
                format!("{}  {}{}", self.colorize("✓ PASSED", "32"), path_display, timing)
            }
            ValidationStatus::Invalid { error_count } => {
                let mut output = format!(
                    "{}  {}{} - {} error{}",
                    self.colorize("✗ FAILED", "31"),
                    path_display,
                    timing,
                    error_count,
                    if *error_count == 1 { "" } else { "s" }
                );
                for violation in &result.violations {
                    if self.verbosity >= VerbosityLevel::Verbose {
                        output.push_str(&format!(
                            "\n    [{}] {}",
                            violation.kind.as_str(),
                            violation.message
                        ));
                    } else {
                        output.push_str(&format!("\n    {}", violation.message));
                    }
                }
                output
            }
            ValidationStatus::Error { message } => {
                format!(
                    "{}  {}{} - {}",
                    self.colorize("⚠ ERROR", "33"),
                    path_display,
                    timing,
                    message
                )
            }
        };
        Some(line)
    }

    /// Everything printed after the run: the summary (human) or the whole
    /// result set (JSON)
    pub fn format_results(&self, results: &ValidationResults) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(results)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
            OutputFormat::Human => self.format_summary(results),
        }
    }

    fn format_summary(&self, results: &ValidationResults) -> String {
        if self.verbosity == VerbosityLevel::Quiet {
            return if results.has_failures() {
                format!(
                    "Invalid: {} Errors: {}\n",
                    results.invalid_files, results.error_files
                )
            } else {
                String::new()
            };
        }

        let mut output = String::new();
        output.push_str("Verification Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Passed:", "32"),
            results.valid_files
        ));
        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Failed:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
            output.push_str(&format!(
                "  Duration: {}\n",
                format_duration(results.total_duration)
            ));
        }

        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerifyError;
    use crate::rules::ValidationError;
    use crate::validator::ValidationResult;

    fn sample_results() -> ValidationResults {
        let bad = ValidationResult::from_errors(vec![ValidationError::DuplicateGuid {
            guid: "abc123".to_string(),
        }]);
        ValidationResults::aggregate(vec![
            FileValidationResult::from_result(
                "feed/good.xml".into(),
                &ValidationResult::new(),
                Duration::from_millis(3),
            ),
            FileValidationResult::from_result("feed/dup.xml".into(), &bad, Duration::from_millis(4)),
            FileValidationResult::error(
                "feed/broken.rss".into(),
                VerifyError::Config("unreadable".to_string()),
                Duration::from_millis(1),
            ),
        ])
    }

    #[test]
    fn test_file_lines_normal() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Human).without_colors();
        let results = sample_results();

        let lines: Vec<_> = results
            .file_results
            .iter()
            .filter_map(|r| output.format_file_result(r))
            .collect();

        assert_eq!(lines[0], "✓ PASSED  feed/good.xml");
        assert_eq!(
            lines[1],
            "✗ FAILED  feed/dup.xml - 1 error\n    duplicate GUID found: abc123"
        );
        assert!(lines[2].starts_with("⚠ ERROR  feed/broken.rss - "));
    }

    #[test]
    fn test_quiet_hides_passing_files() {
        let output = Output::new(VerbosityLevel::Quiet, OutputFormat::Human).without_colors();
        let results = sample_results();

        assert!(output.format_file_result(&results.file_results[0]).is_none());
        assert!(output.format_file_result(&results.file_results[1]).is_some());
        assert_eq!(output.format_results(&results), "Invalid: 1 Errors: 1\n");
    }

    #[test]
    fn test_verbose_shows_kind_and_timing() {
        let output = Output::new(VerbosityLevel::Verbose, OutputFormat::Human).without_colors();
        let results = sample_results();

        let line = output.format_file_result(&results.file_results[1]).unwrap();
        assert!(line.contains("(4ms)"));
        assert!(line.contains("[duplicate-identifier] duplicate GUID found: abc123"));

        let summary = output.format_results(&results);
        assert!(summary.contains("Success rate: 33.3%"));
    }

    #[test]
    fn test_summary() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Human).without_colors();
        let summary = output.format_results(&sample_results());

        assert!(summary.contains("Verification Summary:"));
        assert!(summary.contains("Total files: 3"));
        assert!(summary.contains("Passed: 1"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("Errors: 1"));
    }

    #[test]
    fn test_json_output() {
        let output = Output::new(VerbosityLevel::Normal, OutputFormat::Json);
        assert!(!output.streams_file_results());

        let json: serde_json::Value =
            serde_json::from_str(&output.format_results(&sample_results())).unwrap();
        assert_eq!(json["total_files"], 3);
        assert_eq!(json["file_results"][0]["status"]["status"], "valid");
        assert_eq!(json["file_results"][1]["status"]["error_count"], 1);
        assert_eq!(
            json["file_results"][1]["violations"][0]["kind"],
            "duplicate-identifier"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
