//! Error types for the hashlearn library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`HashlearnError`] enum. Tokenization and feature hashing never fail;
//! estimation and training fail fast, and the streaming loop reports errors
//! per batch.
//!
//! # Examples
//!
//! ```
//! use hashlearn::error::{HashlearnError, Result};
//!
//! fn check_step_size(step_size: f64) -> Result<()> {
//!     if step_size <= 0.0 {
//!         return Err(HashlearnError::invalid_hyperparameter(format!(
//!             "step size must be positive, got {step_size}"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_step_size(0.0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for hashlearn operations.
#[derive(Error, Debug)]
pub enum HashlearnError {
    /// I/O errors (corpus reading, model files, input streams)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Training or fitting was attempted without any examples
    #[error("Empty training set: {0}")]
    EmptyTrainingSet(String),

    /// A feature vector's dimension or index falls outside the configured range
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A hyperparameter is out of its valid range
    #[error("Invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// Input data violates a model's assumptions
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A streaming record could not be decoded
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A batch pipeline stage failed on a specific input
    #[error("{stage} stage failed on {input}: {source}")]
    Stage {
        stage: String,
        input: String,
        #[source]
        source: Box<HashlearnError>,
    },

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HashlearnError.
pub type Result<T> = std::result::Result<T, HashlearnError>;

impl HashlearnError {
    /// Create a new empty training set error.
    pub fn empty_training_set<S: Into<String>>(msg: S) -> Self {
        HashlearnError::EmptyTrainingSet(msg.into())
    }

    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch<S: Into<String>>(msg: S) -> Self {
        HashlearnError::DimensionMismatch(msg.into())
    }

    /// Create a new invalid hyperparameter error.
    pub fn invalid_hyperparameter<S: Into<String>>(msg: S) -> Self {
        HashlearnError::InvalidHyperparameter(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HashlearnError::InvalidArgument(msg.into())
    }

    /// Create a new malformed record error.
    pub fn malformed_record<S: Into<String>>(line: usize, reason: S) -> Self {
        HashlearnError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Wrap an error with the pipeline stage and input it occurred on.
    pub fn stage<S: Into<String>, I: Into<String>>(stage: S, input: I, source: Self) -> Self {
        HashlearnError::Stage {
            stage: stage.into(),
            input: input.into(),
            source: Box::new(source),
        }
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HashlearnError::Other(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        HashlearnError::OperationCancelled(msg.into())
    }

    /// Return the innermost error, looking through stage wrappers.
    pub fn root_cause(&self) -> &HashlearnError {
        match self {
            HashlearnError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = HashlearnError::empty_training_set("no labeled examples");
        assert_eq!(error.to_string(), "Empty training set: no labeled examples");

        let error = HashlearnError::dimension_mismatch("expected 4, found 5");
        assert_eq!(error.to_string(), "Dimension mismatch: expected 4, found 5");

        let error = HashlearnError::malformed_record(3, "missing tab");
        assert_eq!(error.to_string(), "Malformed record at line 3: missing tab");
    }

    #[test]
    fn test_stage_wrapping() {
        let inner = HashlearnError::invalid_hyperparameter("smoothing must be positive");
        let error = HashlearnError::stage("naive-bayes", "training set (12 documents)", inner);

        assert_eq!(
            error.to_string(),
            "naive-bayes stage failed on training set (12 documents): \
             Invalid hyperparameter: smoothing must be positive"
        );
        assert!(matches!(
            error.root_cause(),
            HashlearnError::InvalidHyperparameter(_)
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = HashlearnError::from(io_error);

        match error {
            HashlearnError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
