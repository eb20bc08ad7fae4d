//! Evaluation metrics.
//!
//! Classification metrics are derived from a [`ConfusionMatrix`] keyed by
//! `(actual, predicted)`. For every class `c`:
//!
//! ```text
//! precision(c) = TP / (TP + FP)     (0 when nothing was predicted as c)
//! recall(c)    = TP / (TP + FN)     (0 when c never occurred)
//! F1(c)        = 2 · P · R / (P + R) (0 when P + R = 0)
//! ```
//!
//! Weighted averages weight each class by its support (number of actual
//! occurrences) over the total. All functions are pure.
//!
//! # Examples
//!
//! ```
//! use hashlearn::ml::evaluation::{ConfusionMatrix, MulticlassMetrics};
//!
//! let matrix = ConfusionMatrix::from_counts([(("A", "A"), 8), (("A", "B"), 2), (("B", "B"), 10)]);
//! let metrics = MulticlassMetrics::new(&matrix);
//!
//! assert!((metrics.accuracy() - 0.9).abs() < 1e-12);
//! assert!((metrics.weighted_f_measure() - 89.0 / 99.0).abs() < 1e-12);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Counts of `(actual, predicted)` label pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix<L: Ord + Clone> {
    counts: BTreeMap<(L, L), u64>,
    total: u64,
}

impl<L: Ord + Clone> Default for ConfusionMatrix<L> {
    fn default() -> Self {
        ConfusionMatrix {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<L: Ord + Clone> ConfusionMatrix<L> {
    /// An empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `(predicted, actual)` pairs into a matrix.
    pub fn from_predictions<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, L)>,
    {
        let mut matrix = Self::new();
        for (predicted, actual) in pairs {
            matrix.add(predicted, actual);
        }
        matrix
    }

    /// Build a matrix from explicit `((actual, predicted), count)` entries.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = ((L, L), u64)>,
    {
        let mut matrix = Self::new();
        for ((actual, predicted), count) in counts {
            *matrix.counts.entry((actual, predicted)).or_insert(0) += count;
            matrix.total += count;
        }
        matrix
    }

    /// Record one prediction.
    pub fn add(&mut self, predicted: L, actual: L) {
        *self.counts.entry((actual, predicted)).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of recorded predictions.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Count of `actual` instances predicted as `predicted`.
    pub fn count(&self, actual: &L, predicted: &L) -> u64 {
        self.counts
            .get(&(actual.clone(), predicted.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// The union of actual and predicted labels, sorted.
    pub fn labels(&self) -> Vec<L> {
        let labels: BTreeSet<&L> = self
            .counts
            .keys()
            .flat_map(|(actual, predicted)| [actual, predicted])
            .collect();
        labels.into_iter().cloned().collect()
    }

    /// Iterate over non-zero `((actual, predicted), count)` entries.
    pub fn entries(&self) -> impl Iterator<Item = (&L, &L, u64)> {
        self.counts
            .iter()
            .map(|((actual, predicted), count)| (actual, predicted, *count))
    }
}

/// Metrics of a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics<L> {
    pub label: L,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f_beta(precision: f64, recall: f64, beta: f64) -> f64 {
    let beta2 = beta * beta;
    let denominator = beta2 * precision + recall;
    if denominator == 0.0 {
        0.0
    } else {
        (1.0 + beta2) * precision * recall / denominator
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    true_positives: u64,
    predicted: u64,
    actual: u64,
}

/// Accuracy, per-class and weighted metrics of a confusion matrix.
#[derive(Debug, Clone)]
pub struct MulticlassMetrics<L: Ord + Clone> {
    tallies: BTreeMap<L, Tally>,
    total: u64,
}

impl<L: Ord + Clone> MulticlassMetrics<L> {
    /// Compute the per-class tallies of a matrix.
    pub fn new(matrix: &ConfusionMatrix<L>) -> Self {
        let mut tallies: BTreeMap<L, Tally> = BTreeMap::new();
        for (actual, predicted, count) in matrix.entries() {
            tallies.entry(actual.clone()).or_default().actual += count;
            tallies.entry(predicted.clone()).or_default().predicted += count;
            if actual == predicted {
                tallies.entry(actual.clone()).or_default().true_positives += count;
            }
        }
        MulticlassMetrics {
            tallies,
            total: matrix.total(),
        }
    }

    /// Number of evaluated predictions.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Fraction of correct predictions; 0 when nothing was evaluated.
    pub fn accuracy(&self) -> f64 {
        let correct = self.tallies.values().map(|t| t.true_positives).sum();
        ratio(correct, self.total)
    }

    /// Precision of one class.
    pub fn precision(&self, label: &L) -> f64 {
        self.tallies
            .get(label)
            .map_or(0.0, |t| ratio(t.true_positives, t.predicted))
    }

    /// Recall of one class.
    pub fn recall(&self, label: &L) -> f64 {
        self.tallies
            .get(label)
            .map_or(0.0, |t| ratio(t.true_positives, t.actual))
    }

    /// F-measure of one class.
    pub fn f_measure(&self, label: &L, beta: f64) -> f64 {
        f_beta(self.precision(label), self.recall(label), beta)
    }

    /// F1 of one class.
    pub fn f1(&self, label: &L) -> f64 {
        self.f_measure(label, 1.0)
    }

    fn weighted<F: Fn(&L) -> f64>(&self, metric: F) -> f64 {
        self.tallies
            .iter()
            .map(|(label, tally)| ratio(tally.actual, self.total) * metric(label))
            .sum()
    }

    /// Support-weighted precision.
    pub fn weighted_precision(&self) -> f64 {
        self.weighted(|label| self.precision(label))
    }

    /// Support-weighted recall.
    pub fn weighted_recall(&self) -> f64 {
        self.weighted(|label| self.recall(label))
    }

    /// Support-weighted F1.
    pub fn weighted_f_measure(&self) -> f64 {
        self.f_measure_beta(1.0)
    }

    /// Support-weighted F-measure for an arbitrary `beta`.
    pub fn f_measure_beta(&self, beta: f64) -> f64 {
        self.weighted(|label| self.f_measure(label, beta))
    }

    /// Metrics of every class, ordered by label.
    pub fn per_class(&self) -> Vec<ClassMetrics<L>> {
        self.tallies
            .iter()
            .map(|(label, tally)| ClassMetrics {
                label: label.clone(),
                precision: self.precision(label),
                recall: self.recall(label),
                f1: self.f1(label),
                support: tally.actual,
            })
            .collect()
    }
}

/// Error metrics of real-valued predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub count: u64,
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    pub mean_absolute_error: f64,
}

impl RegressionMetrics {
    /// Compute metrics from `(prediction, label)` pairs; all zero when empty.
    pub fn from_predictions<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut count = 0u64;
        let mut squared = 0.0;
        let mut absolute = 0.0;
        for (prediction, label) in pairs {
            let error = prediction - label;
            count += 1;
            squared += error * error;
            absolute += error.abs();
        }
        if count == 0 {
            return Self::default();
        }

        let mean_squared_error = squared / count as f64;
        RegressionMetrics {
            count,
            mean_squared_error,
            root_mean_squared_error: mean_squared_error.sqrt(),
            mean_absolute_error: absolute / count as f64,
        }
    }
}
