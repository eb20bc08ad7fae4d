//! The streaming update loop.
//!
//! A [`StreamingRunner`] is the single owner of a
//! [`StreamingLinearRegression`]. It pulls batches from a [`BatchSource`] in
//! arrival order, scores each batch with the current model (prequential
//! evaluation), applies it, and publishes a snapshot of the model through a
//! [`SharedModel`] handle. A failed batch is reported and skipped; the loop
//! keeps running until the source is exhausted or the run is cancelled.
//!
//! # Examples
//!
//! ```
//! use hashlearn::config::StreamingConfig;
//! use hashlearn::ml::dataset::LabeledVector;
//! use hashlearn::ml::linear::StreamingLinearRegression;
//! use hashlearn::stream::runner::StreamingRunner;
//! use hashlearn::stream::source::channel_source;
//!
//! let regression = StreamingLinearRegression::new(vec![0.0, 0.0], &StreamingConfig::default()).unwrap();
//! let mut runner = StreamingRunner::new(regression);
//! let model = runner.shared_model();
//!
//! let (sender, mut source) = channel_source(4);
//! sender.send(vec![LabeledVector::from_dense(1.0, &[1.0, 0.0])]).unwrap();
//! drop(sender);
//!
//! let summary = runner.run(&mut source, |_| {});
//! assert_eq!(summary.batches_applied, 1);
//! assert_eq!(model.snapshot().weights(), &[0.1, 0.0]);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::dataset::LabeledVector;
use crate::ml::evaluation::RegressionMetrics;
use crate::ml::linear::{LinearModel, StreamingLinearRegression};
use crate::stream::cancel::CancellationToken;
use crate::stream::source::BatchSource;

/// Read-only snapshots of the model being trained.
///
/// A snapshot is replaced only after a batch has been applied in full, so
/// readers never observe a partially applied batch.
#[derive(Debug, Clone)]
pub struct SharedModel {
    current: Arc<RwLock<Arc<LinearModel>>>,
}

impl SharedModel {
    fn new(model: LinearModel) -> Self {
        SharedModel {
            current: Arc::new(RwLock::new(Arc::new(model))),
        }
    }

    /// The latest published model.
    pub fn snapshot(&self) -> Arc<LinearModel> {
        Arc::clone(&self.current.read())
    }

    fn publish(&self, model: LinearModel) {
        *self.current.write() = Arc::new(model);
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Applied,
    Empty,
    Rejected,
}

/// Report of one processed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: u64,
    pub size: usize,
    pub status: BatchStatus,
    pub error: Option<String>,
    /// Error of the model before it saw the batch.
    pub prequential: Option<RegressionMetrics>,
    pub processed_at: DateTime<Utc>,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub batches_received: u64,
    pub batches_applied: u64,
    pub batches_rejected: u64,
    pub observations_applied: u64,
    pub cancelled: bool,
}

/// Drives a streaming regression from a batch source.
#[derive(Debug)]
pub struct StreamingRunner {
    regression: StreamingLinearRegression,
    shared: SharedModel,
    cancel: CancellationToken,
    next_batch_id: u64,
}

impl StreamingRunner {
    /// Take ownership of a regression.
    pub fn new(regression: StreamingLinearRegression) -> Self {
        let shared = SharedModel::new(regression.model().clone());
        StreamingRunner {
            regression,
            shared,
            cancel: CancellationToken::new(),
            next_batch_id: 0,
        }
    }

    /// A handle for reading model snapshots from other threads.
    pub fn shared_model(&self) -> SharedModel {
        self.shared.clone()
    }

    /// A token that stops [`run`](Self::run) when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The regression being trained.
    pub fn regression(&self) -> &StreamingLinearRegression {
        &self.regression
    }

    /// Release the regression.
    pub fn into_regression(self) -> StreamingLinearRegression {
        self.regression
    }

    /// Score, apply and publish one batch.
    pub fn process(&mut self, batch: Result<Vec<LabeledVector>>) -> BatchReport {
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let batch = match batch {
            Ok(batch) => batch,
            Err(error) => {
                warn!("batch {batch_id} rejected: {error}");
                return BatchReport {
                    batch_id,
                    size: 0,
                    status: BatchStatus::Rejected,
                    error: Some(error.to_string()),
                    prequential: None,
                    processed_at: Utc::now(),
                };
            }
        };

        if batch.is_empty() {
            debug!("batch {batch_id} is empty");
            return BatchReport {
                batch_id,
                size: 0,
                status: BatchStatus::Empty,
                error: None,
                prequential: None,
                processed_at: Utc::now(),
            };
        }

        let prequential = batch
            .iter()
            .map(|point| {
                self.regression
                    .predict(&point.features)
                    .map(|prediction| (prediction, point.label))
            })
            .collect::<Result<Vec<_>>>()
            .ok()
            .map(RegressionMetrics::from_predictions);

        match self.regression.update(&batch) {
            Ok(applied) => {
                self.shared.publish(self.regression.model().clone());
                match &prequential {
                    Some(metrics) => info!(
                        "batch {batch_id} applied: {applied} observations, mse {:.6}",
                        metrics.mean_squared_error
                    ),
                    None => info!("batch {batch_id} applied: {applied} observations"),
                }
                BatchReport {
                    batch_id,
                    size: batch.len(),
                    status: BatchStatus::Applied,
                    error: None,
                    prequential,
                    processed_at: Utc::now(),
                }
            }
            Err(error) => {
                warn!("batch {batch_id} rejected: {error}");
                BatchReport {
                    batch_id,
                    size: batch.len(),
                    status: BatchStatus::Rejected,
                    error: Some(error.to_string()),
                    prequential,
                    processed_at: Utc::now(),
                }
            }
        }
    }

    /// Process batches until the source is exhausted or the run is cancelled.
    ///
    /// `on_report` is called after every batch.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_report: F) -> StreamSummary
    where
        S: BatchSource + ?Sized,
        F: FnMut(&BatchReport),
    {
        let mut summary = StreamSummary::default();
        let cancel = self.cancel.clone();

        while let Some(batch) = source.next_batch(&cancel) {
            let report = self.process(batch);
            summary.batches_received += 1;
            match report.status {
                BatchStatus::Applied => {
                    summary.batches_applied += 1;
                    summary.observations_applied += report.size as u64;
                }
                BatchStatus::Rejected => summary.batches_rejected += 1,
                BatchStatus::Empty => {}
            }
            on_report(&report);
        }

        summary.cancelled = cancel.is_cancelled();
        info!(
            "streaming stopped{}: {} batches applied, {} rejected",
            if summary.cancelled { " (cancelled)" } else { "" },
            summary.batches_applied,
            summary.batches_rejected
        );
        summary
    }
}
