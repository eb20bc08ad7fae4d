//! Linear regression trained online with stochastic gradient descent.
//!
//! [`StreamingLinearRegression`] owns one [`LinearModel`] and updates it once
//! per observation as micro-batches arrive. For every pass over a batch of
//! size `n` and every observation `(y, x)` in arrival order:
//!
//! ```text
//! error = w · x + b - y
//! w     = w - η · error · x / n
//! b     = b - η · error / n        (only when fitting an intercept)
//! ```
//!
//! A batch is applied atomically: it is validated in full before any
//! arithmetic, updated on a scratch copy, and committed only when every
//! resulting weight is finite. A rejected batch leaves the model untouched.
//!
//! # Examples
//!
//! ```
//! use hashlearn::config::StreamingConfig;
//! use hashlearn::ml::dataset::LabeledVector;
//! use hashlearn::ml::linear::StreamingLinearRegression;
//!
//! let mut regression = StreamingLinearRegression::new(vec![0.0, 0.0], &StreamingConfig::default()).unwrap();
//! regression.update(&[LabeledVector::from_dense(1.0, &[1.0, 0.0])]).unwrap();
//!
//! assert_eq!(regression.model().weights(), &[0.1, 0.0]);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::StreamingConfig;
use crate::error::{HashlearnError, Result};
use crate::feature::sparse::FeatureVector;
use crate::ml::dataset::LabeledVector;

/// Weight vector and intercept of a linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Create a model from its parameters.
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        LinearModel { weights, intercept }
    }

    /// The weight vector.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of weights.
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// `w · x + b`.
    pub fn predict<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<f64> {
        if features.dimension() != self.weights.len() {
            return Err(HashlearnError::dimension_mismatch(format!(
                "vector has dimension {}, model has {} weights",
                features.dimension(),
                self.weights.len()
            )));
        }
        Ok(features.dot(&self.weights) + self.intercept)
    }

    /// Write the model as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Read a model written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Lifecycle of a streaming model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    /// Still holding the initial weights.
    Uninitialized,
    /// At least one non-empty batch has been applied.
    Trained,
}

/// Online linear regression over ordered micro-batches.
#[derive(Debug, Clone)]
pub struct StreamingLinearRegression {
    model: LinearModel,
    step_size: f64,
    num_iterations: usize,
    fit_intercept: bool,
    state: ModelState,
    batches_applied: u64,
    observations_applied: u64,
}

impl StreamingLinearRegression {
    /// Create a regressor starting from `initial_weights` with intercept 0.
    pub fn new(initial_weights: Vec<f64>, config: &StreamingConfig) -> Result<Self> {
        Self::from_model(LinearModel::new(initial_weights, 0.0), config)
    }

    /// Create a regressor continuing from an existing model.
    pub fn from_model(model: LinearModel, config: &StreamingConfig) -> Result<Self> {
        config.validate()?;
        if model.dimension() == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "initial weights must not be empty",
            ));
        }
        if !model.weights.iter().all(|w| w.is_finite()) || !model.intercept.is_finite() {
            return Err(HashlearnError::invalid_argument(
                "initial weights must be finite",
            ));
        }

        Ok(StreamingLinearRegression {
            model,
            step_size: config.step_size,
            num_iterations: config.num_iterations,
            fit_intercept: config.fit_intercept,
            state: ModelState::Uninitialized,
            batches_applied: 0,
            observations_applied: 0,
        })
    }

    /// The current model.
    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Number of non-empty batches applied.
    pub fn batches_applied(&self) -> u64 {
        self.batches_applied
    }

    /// Number of observations applied, counted once per batch.
    pub fn observations_applied(&self) -> u64 {
        self.observations_applied
    }

    /// The SGD step size.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Predict with the current model.
    pub fn predict<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<f64> {
        self.model.predict(features)
    }

    fn validate_batch(&self, batch: &[LabeledVector]) -> Result<()> {
        let dimension = self.model.dimension();
        for (position, point) in batch.iter().enumerate() {
            if point.dimension() != dimension {
                return Err(HashlearnError::dimension_mismatch(format!(
                    "observation {position} has dimension {}, model has {dimension}",
                    point.dimension()
                )));
            }
            if !point.label.is_finite() {
                return Err(HashlearnError::invalid_argument(format!(
                    "observation {position} has non-finite label {}",
                    point.label
                )));
            }
            if let Some((index, value)) = point.features.active().find(|(_, v)| !v.is_finite()) {
                return Err(HashlearnError::invalid_argument(format!(
                    "observation {position} has non-finite value {value} at feature {index}"
                )));
            }
        }
        Ok(())
    }

    /// Apply one batch and return the number of observations applied.
    ///
    /// Empty batches are no-ops. On error the model is unchanged.
    pub fn update(&mut self, batch: &[LabeledVector]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        self.validate_batch(batch)?;

        let batch_size = batch.len() as f64;
        let mut weights = self.model.weights.clone();
        let mut intercept = self.model.intercept;

        for _ in 0..self.num_iterations {
            for point in batch {
                let prediction = point.features.dot(&weights) + intercept;
                let scale = self.step_size * (prediction - point.label) / batch_size;
                for (index, value) in point.features.active() {
                    weights[index] -= scale * value;
                }
                if self.fit_intercept {
                    intercept -= scale;
                }
            }
        }

        if !weights.iter().all(|w| w.is_finite()) || !intercept.is_finite() {
            return Err(HashlearnError::invalid_argument(
                "update diverged to non-finite weights, lower the step size",
            ));
        }

        self.model.weights = weights;
        self.model.intercept = intercept;
        self.state = ModelState::Trained;
        self.batches_applied += 1;
        self.observations_applied += batch.len() as u64;
        Ok(batch.len())
    }

    /// Release the model.
    pub fn into_model(self) -> LinearModel {
        self.model
    }
}
