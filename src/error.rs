//! Unified error types for GradePal.
//!
//! Nothing in the core is fatal. Persistence failures are logged and the
//! in-memory collection stays authoritative; validation failures are reported
//! back to the caller before the store is touched; prediction failures are
//! surfaced as an opaque error the user can retry.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for GradePal operations.
#[derive(Error, Debug)]
pub enum GradepalError {
    /// I/O errors from the storage substrate.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Input rejected at the validation boundary.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A course or grade id did not resolve.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The prediction service failed or returned an unusable payload.
    #[error("prediction failed: {message}")]
    Prediction { message: String },
}

/// A specialized Result type for GradePal operations.
pub type Result<T> = std::result::Result<T, GradepalError>;

impl GradepalError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a course-not-found error.
    pub fn course_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "course",
            id: id.into(),
        }
    }

    /// Create a grade-not-found error.
    pub fn grade_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "grade",
            id: id.into(),
        }
    }

    /// Create a prediction error.
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction {
            message: message.into(),
        }
    }

    /// Whether the error comes from the persistence layer.
    ///
    /// Persistence errors are never surfaced as blocking conditions.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Serde { .. })
    }
}

impl From<io::Error> for GradepalError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for GradepalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for GradepalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Prediction {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Logs the error as a warning and hands back a fallback value, so a broken
/// substrate degrades to "state unchanged" instead of aborting the caller.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} (fail-open: using default)", context);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} (fail-open: using fallback)", context);
                fallback
            }
        }
    }
}

/// Exit codes for the GradePal CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command was rejected or failed (validation, missing id, prediction).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = GradepalError::storage(
            "/tmp/courses.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/courses.json"));
    }

    #[test]
    fn test_serde_error_display() {
        let err = GradepalError::serde("invalid JSON");
        assert_eq!(err.to_string(), "serialization error: invalid JSON");
    }

    #[test]
    fn test_config_error_display() {
        let err = GradepalError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_validation_error_display() {
        let err = GradepalError::validation("weight: Weight can't exceed 100.");
        assert_eq!(
            err.to_string(),
            "validation error: weight: Weight can't exceed 100."
        );
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            GradepalError::course_not_found("abc").to_string(),
            "course not found: abc"
        );
        assert_eq!(
            GradepalError::grade_not_found("g1").to_string(),
            "grade not found: g1"
        );
    }

    #[test]
    fn test_prediction_error_display() {
        let err = GradepalError::prediction("service unavailable");
        assert_eq!(err.to_string(), "prediction failed: service unavailable");
    }

    #[test]
    fn test_is_persistence() {
        assert!(GradepalError::serde("x").is_persistence());
        assert!(GradepalError::from(io::Error::other("x")).is_persistence());
        assert!(!GradepalError::validation("x").is_persistence());
        assert!(!GradepalError::prediction("x").is_persistence());
        assert!(!GradepalError::course_not_found("x").is_persistence());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: GradepalError = json_err.into();
        assert!(matches!(err, GradepalError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(GradepalError::serde("test"));
        let value = result.fail_open_default("test context");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(GradepalError::serde("test"));
        assert_eq!(result.fail_open_with("test context", 42), 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        assert_eq!(result.fail_open_default("test context"), 100);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::CRASH, 3);
    }
}
