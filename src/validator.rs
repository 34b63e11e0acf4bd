//! Feed validation engine
//!
//! Two layers live here:
//! - [`validate_document`] runs every rule against one parsed feed and merges
//!   their errors into a single [`ValidationResult`].
//! - [`ValidationEngine`] drives a whole run: discover files, read and parse
//!   each one, validate it, and fold the per-file outcomes into
//!   [`ValidationResults`]. Files are processed one at a time in discovery
//!   order so reports are reproducible.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, VerifyError};
use crate::feed::{FeedDocument, parse_feed};
use crate::file_discovery::FileDiscovery;
use crate::rules::{Rule, ValidationError, ViolationKind};

/// Every rule violation found in one feed document, in rule order.
///
/// An empty result means the document is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Combine several results into one, keeping every error and its order.
    pub fn join(results: impl IntoIterator<Item = ValidationResult>) -> Self {
        let mut joined = Self::new();
        for result in results {
            joined.merge(result);
        }
        joined
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when valid, otherwise the whole result as an error.
    pub fn into_result(self) -> std::result::Result<(), ValidationResult> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationResult {}

impl FromIterator<ValidationError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Run every rule against `doc`.
///
/// A failing rule never prevents the later ones from running.
pub fn validate_document(doc: &FeedDocument) -> ValidationResult {
    ValidationResult::join(Rule::ALL.into_iter().map(|rule| {
        let errors = rule.check(doc);
        if !errors.is_empty() {
            debug!(rule = rule.name(), count = errors.len(), "rule reported violations");
        }
        ValidationResult::from_errors(errors)
    }))
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationConfig {
    /// Stop after the first file that does not pass
    pub fail_fast: bool,
}

/// Outcome of checking a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Parsed and broke no rules
    Valid,
    /// Parsed, but broke one or more rules
    Invalid { error_count: usize },
    /// Could not be read or parsed
    Error { message: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationStatus::Error { .. })
    }
}

/// A rule violation as shown in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl From<&ValidationError> for Violation {
    fn from(error: &ValidationError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub status: ValidationStatus,
    pub duration: Duration,
    pub violations: Vec<Violation>,
}

impl FileValidationResult {
    pub fn from_result(path: PathBuf, result: &ValidationResult, duration: Duration) -> Self {
        let status = if result.is_valid() {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid {
                error_count: result.error_count(),
            }
        };
        Self {
            path,
            status,
            duration,
            violations: result.errors().iter().map(Violation::from).collect(),
        }
    }

    pub fn error(path: PathBuf, error: VerifyError, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Error {
                message: error.to_string(),
            },
            duration,
            violations: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status.is_valid()
    }
}

/// Aggregated results of one run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    pub total_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
}

impl ValidationResults {
    /// Fold per-file results into totals.
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let (valid_files, invalid_files, error_files, total_duration) = file_results.iter().fold(
            (0, 0, 0, Duration::ZERO),
            |(valid, invalid, error, duration), result| match result.status {
                ValidationStatus::Valid => (valid + 1, invalid, error, duration + result.duration),
                ValidationStatus::Invalid { .. } => {
                    (valid, invalid + 1, error, duration + result.duration)
                }
                ValidationStatus::Error { .. } => {
                    (valid, invalid, error + 1, duration + result.duration)
                }
            },
        );

        Self {
            total_files: file_results.len(),
            valid_files,
            invalid_files,
            error_files,
            total_duration,
            file_results,
        }
    }

    /// True if any file failed to parse or broke a rule
    pub fn has_failures(&self) -> bool {
        self.file_results.iter().any(|result| !result.passed())
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.valid_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Called once per file, as soon as its result is known
pub type ProgressCallback = Arc<dyn Fn(&FileValidationResult) + Send + Sync>;

/// Drives discovery, parsing and validation for a whole run
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Discover feed files under `path` and validate each of them.
    ///
    /// Fails only if discovery fails; per-file problems are recorded in the
    /// returned results.
    pub async fn validate_path(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
    ) -> Result<ValidationResults> {
        self.validate_path_with_progress(path, file_discovery, None)
            .await
    }

    pub async fn validate_path_with_progress(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<ValidationResults> {
        let start = Instant::now();
        let files = file_discovery.discover_files(path).await?;
        info!(
            root = %path.display(),
            files = files.len(),
            elapsed = ?start.elapsed(),
            "discovered feed files"
        );

        let file_results = self.validate_files_with_progress(files, progress_callback).await;
        let results = ValidationResults::aggregate(file_results);
        info!(
            total = results.total_files,
            valid = results.valid_files,
            invalid = results.invalid_files,
            errors = results.error_files,
            "validation finished"
        );
        Ok(results)
    }

    pub async fn validate_files(&self, files: Vec<PathBuf>) -> Vec<FileValidationResult> {
        self.validate_files_with_progress(files, None).await
    }

    pub async fn validate_files_with_progress(
        &self,
        files: Vec<PathBuf>,
        progress_callback: Option<ProgressCallback>,
    ) -> Vec<FileValidationResult> {
        let mut results = Vec::with_capacity(files.len());

        for path in files {
            let result = self.validate_single_file(&path).await;
            if let Some(ref callback) = progress_callback {
                callback(&result);
            }

            let stop = self.config.fail_fast && !result.passed();
            results.push(result);
            if stop {
                debug!("fail-fast: stopping after first failing file");
                break;
            }
        }

        results
    }

    /// Read, parse and validate one file.
    pub async fn validate_single_file(&self, path: &Path) -> FileValidationResult {
        let start = Instant::now();
        debug!(path = %path.display(), "verifying");

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file");
                return FileValidationResult::error(
                    path.to_path_buf(),
                    VerifyError::Read {
                        path: path.to_path_buf(),
                        source: e,
                    },
                    start.elapsed(),
                );
            }
        };

        Self::validate_bytes(path, &bytes, start)
    }

    fn validate_bytes(path: &Path, bytes: &[u8], start: Instant) -> FileValidationResult {
        let doc = match parse_feed(bytes) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid XML");
                return FileValidationResult::error(
                    path.to_path_buf(),
                    VerifyError::Parse {
                        path: path.to_path_buf(),
                        source: e,
                    },
                    start.elapsed(),
                );
            }
        };

        let result = validate_document(&doc);
        if !result.is_valid() {
            warn!(
                path = %path.display(),
                errors = result.error_count(),
                "feed failed validation"
            );
        }
        FileValidationResult::from_result(path.to_path_buf(), &result, start.elapsed())
    }
}
