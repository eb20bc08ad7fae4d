//! Configuration for the batch classification pipeline and the streaming
//! regression loop.
//!
//! Every struct has sensible defaults and deserializes from partial JSON:
//!
//! ```
//! use hashlearn::config::PipelineConfig;
//!
//! let config: PipelineConfig = serde_json::from_str(r#"{ "smoothing": 0.5 }"#).unwrap();
//! assert_eq!(config.smoothing, 0.5);
//! assert_eq!(config.num_features, 1 << 18);
//! assert_eq!(config.analysis.min_token_length, 2);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::length::DEFAULT_MIN_TOKEN_LENGTH;
use crate::analysis::token_filter::rare::DEFAULT_MIN_TERM_COUNT;
use crate::analysis::tokenizer::regex::NON_WORD_PATTERN;
use crate::error::{HashlearnError, Result};
use crate::feature::hashing::DEFAULT_NUM_FEATURES;
use crate::ml::naive_bayes::DEFAULT_SMOOTHING;

/// Read a JSON configuration file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

/// Text analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Separator pattern; text between matches becomes tokens.
    pub token_pattern: String,
    /// Minimum token length in characters.
    pub min_token_length: usize,
    /// Terms occurring fewer times than this across the training corpus are dropped.
    pub min_term_count: usize,
    /// Custom stop words. `None` selects the built-in English list.
    pub stop_words: Option<Vec<String>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            token_pattern: NON_WORD_PATTERN.to_string(),
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
            min_term_count: DEFAULT_MIN_TERM_COUNT,
            stop_words: None,
        }
    }
}

/// Settings for the batch document classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Text analysis settings.
    pub analysis: AnalysisConfig,
    /// Feature space dimension for the hashing trick.
    pub num_features: usize,
    /// Count every present term once instead of by frequency.
    pub binary_tf: bool,
    /// Features present in fewer training documents get IDF weight 0.
    pub min_doc_freq: usize,
    /// Additive smoothing for Naive Bayes.
    pub smoothing: f64,
    /// Fraction of documents held out for evaluation when the corpus does
    /// not name its own train/test split.
    pub test_fraction: f64,
    /// Seed for the random train/test split.
    pub seed: u64,
    /// Worker threads for the parallel stages.
    pub parallelism: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            num_features: DEFAULT_NUM_FEATURES,
            binary_tf: false,
            min_doc_freq: 0,
            smoothing: DEFAULT_SMOOTHING,
            test_fraction: 0.3,
            seed: 42,
            parallelism: default_num_threads(),
        }
    }
}

impl PipelineConfig {
    /// Load a pipeline configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Check every hyperparameter range.
    pub fn validate(&self) -> Result<()> {
        if self.num_features == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "num_features must be positive",
            ));
        }
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(HashlearnError::invalid_hyperparameter(format!(
                "smoothing must be positive, got {}",
                self.smoothing
            )));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(HashlearnError::invalid_hyperparameter(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.parallelism == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "parallelism must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Settings for the streaming linear regression loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// SGD step size.
    pub step_size: f64,
    /// Passes over each batch.
    pub num_iterations: usize,
    /// Learn an intercept alongside the weights.
    pub fit_intercept: bool,
    /// Width of the time window that forms one batch.
    pub batch_interval_ms: u64,
    /// Batches buffered between the source and the update loop.
    pub queue_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            num_iterations: 1,
            fit_intercept: false,
            batch_interval_ms: 10_000,
            queue_capacity: 16,
        }
    }
}

impl StreamingConfig {
    /// Load a streaming configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// The batch window as a duration.
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Check every hyperparameter range.
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(HashlearnError::invalid_hyperparameter(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        if self.num_iterations == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "num_iterations must be at least 1",
            ));
        }
        if self.batch_interval_ms == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "batch_interval_ms must be positive",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "queue_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}
