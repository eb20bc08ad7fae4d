//! Learning algorithms and their evaluation.
//!
//! - [`naive_bayes`]: multinomial Naive Bayes for document classification
//! - [`linear`]: linear regression updated online by SGD
//! - [`evaluation`]: confusion matrices, classification and regression metrics
//! - [`dataset`] and [`labels`]: the data those algorithms consume

pub mod dataset;
pub mod evaluation;
pub mod labels;
pub mod linear;
pub mod naive_bayes;

pub use dataset::{Document, LabeledDocument, LabeledVector};
pub use evaluation::{ConfusionMatrix, MulticlassMetrics, RegressionMetrics};
pub use labels::LabelIndexer;
pub use linear::{LinearModel, ModelState, StreamingLinearRegression};
pub use naive_bayes::{NaiveBayes, NaiveBayesModel};
