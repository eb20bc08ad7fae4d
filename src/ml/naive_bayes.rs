//! Multinomial Naive Bayes.
//!
//! Training aggregates, per class, the number of examples and the summed
//! feature values. With additive smoothing `λ` and feature dimension `D`:
//!
//! ```text
//! log prior(c)      = ln(count(c) / total)
//! log theta(c, f)   = ln((sum_c[f] + λ) / (mass(c) + λ · D))
//! score(c, x)       = log prior(c) + Σ_f x[f] · log theta(c, f)
//! ```
//!
//! Conditional log-likelihoods are stored only for features observed during
//! training (non-zero mass in at least one class); any other feature
//! contributes nothing to a score. Prediction takes the arg max of the
//! scores, ties going to the lowest class index.
//!
//! # Examples
//!
//! ```
//! use hashlearn::ml::dataset::LabeledVector;
//! use hashlearn::ml::naive_bayes::NaiveBayes;
//!
//! let training = vec![
//!     LabeledVector::from_dense(0.0, &[3.0, 0.0, 1.0]),
//!     LabeledVector::from_dense(1.0, &[0.0, 4.0, 1.0]),
//! ];
//! let model = NaiveBayes::new(1.0).unwrap().train(&training).unwrap();
//!
//! let query = LabeledVector::from_dense(0.0, &[0.0, 2.0, 0.0]);
//! assert_eq!(model.predict(&query.features).unwrap(), 1.0);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HashlearnError, Result};
use crate::feature::sparse::FeatureVector;
use crate::ml::dataset::LabeledVector;

/// Default additive smoothing.
pub const DEFAULT_SMOOTHING: f64 = 0.1;

/// Running totals for one class.
#[derive(Debug, Default, Clone)]
struct ClassAggregate {
    count: u64,
    mass: f64,
    feature_sums: AHashMap<usize, f64>,
}

impl ClassAggregate {
    fn add(&mut self, point: &LabeledVector) {
        self.count += 1;
        for (index, value) in point.features.active() {
            self.mass += value;
            *self.feature_sums.entry(index).or_insert(0.0) += value;
        }
    }

    fn merge(&mut self, other: ClassAggregate) {
        self.count += other.count;
        self.mass += other.mass;
        for (index, value) in other.feature_sums {
            *self.feature_sums.entry(index).or_insert(0.0) += value;
        }
    }
}

fn merge_aggregates(
    mut left: AHashMap<u64, ClassAggregate>,
    right: AHashMap<u64, ClassAggregate>,
) -> AHashMap<u64, ClassAggregate> {
    for (label, aggregate) in right {
        left.entry(label).or_default().merge(aggregate);
    }
    left
}

/// Multinomial Naive Bayes trainer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaiveBayes {
    smoothing: f64,
}

impl Default for NaiveBayes {
    fn default() -> Self {
        NaiveBayes {
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl NaiveBayes {
    /// Create a trainer with the given additive smoothing, which must be positive.
    pub fn new(smoothing: f64) -> Result<Self> {
        if !(smoothing.is_finite() && smoothing > 0.0) {
            return Err(HashlearnError::invalid_hyperparameter(format!(
                "smoothing must be positive, got {smoothing}"
            )));
        }
        Ok(NaiveBayes { smoothing })
    }

    /// The additive smoothing.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    fn validate(data: &[LabeledVector]) -> Result<usize> {
        let first = data.first().ok_or_else(|| {
            HashlearnError::empty_training_set("cannot train Naive Bayes without examples")
        })?;
        let dimension = first.dimension();

        for (position, point) in data.iter().enumerate() {
            let label = point.label;
            if !(label.is_finite() && label >= 0.0 && label.fract() == 0.0) {
                return Err(HashlearnError::invalid_argument(format!(
                    "example {position}: label {label} is not a non-negative integer"
                )));
            }
            if point.dimension() != dimension {
                return Err(HashlearnError::dimension_mismatch(format!(
                    "example {position} has dimension {}, expected {dimension}",
                    point.dimension()
                )));
            }
            if let Some((index, value)) = point
                .features
                .active()
                .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
            {
                return Err(HashlearnError::invalid_argument(format!(
                    "example {position}: feature {index} has value {value}, \
                     multinomial Naive Bayes needs non-negative values"
                )));
            }
        }

        Ok(dimension)
    }

    /// Train a model. All examples must share one dimension.
    pub fn train(&self, data: &[LabeledVector]) -> Result<NaiveBayesModel> {
        let dimension = Self::validate(data)?;
        let start = Instant::now();

        let aggregates = data
            .par_iter()
            .fold(AHashMap::new, |mut aggregates: AHashMap<u64, ClassAggregate>, point| {
                aggregates
                    .entry(point.label as u64)
                    .or_default()
                    .add(point);
                aggregates
            })
            .reduce(AHashMap::new, merge_aggregates);

        let classes: BTreeMap<u64, ClassAggregate> = aggregates.into_iter().collect();

        let mut feature_indices: Vec<usize> = classes
            .values()
            .flat_map(|aggregate| {
                aggregate
                    .feature_sums
                    .iter()
                    .filter(|(_, sum)| **sum > 0.0)
                    .map(|(index, _)| *index)
            })
            .collect();
        feature_indices.sort_unstable();
        feature_indices.dedup();

        let total = data.len() as f64;
        let smoothed_dimension = self.smoothing * dimension as f64;
        let mut labels = Vec::with_capacity(classes.len());
        let mut log_priors = Vec::with_capacity(classes.len());
        let mut log_likelihoods = Vec::with_capacity(classes.len());

        for (label, aggregate) in &classes {
            labels.push(*label as f64);
            log_priors.push((aggregate.count as f64 / total).ln());

            let denominator = (aggregate.mass + smoothed_dimension).ln();
            let row = feature_indices
                .iter()
                .map(|index| {
                    let sum = aggregate.feature_sums.get(index).copied().unwrap_or(0.0);
                    (sum + self.smoothing).ln() - denominator
                })
                .collect();
            log_likelihoods.push(row);
        }

        debug!(
            "trained Naive Bayes on {} examples, {} classes, {} observed features in {:?}",
            data.len(),
            labels.len(),
            feature_indices.len(),
            start.elapsed()
        );

        Ok(NaiveBayesModel {
            dimension,
            smoothing: self.smoothing,
            labels,
            log_priors,
            feature_indices,
            log_likelihoods,
        })
    }
}

/// A trained multinomial Naive Bayes model. Immutable once trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    dimension: usize,
    smoothing: f64,
    /// Class labels in ascending order; position is the class index.
    labels: Vec<f64>,
    log_priors: Vec<f64>,
    /// Observed feature indices, sorted.
    feature_indices: Vec<usize>,
    /// Per class, log-likelihoods parallel to `feature_indices`.
    log_likelihoods: Vec<Vec<f64>>,
}

impl NaiveBayesModel {
    /// Feature dimension the model was trained on.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Smoothing the model was trained with.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Class labels in class index order.
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Number of classes.
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Per-class log priors.
    pub fn log_priors(&self) -> &[f64] {
        &self.log_priors
    }

    /// Features observed during training.
    pub fn observed_features(&self) -> &[usize] {
        &self.feature_indices
    }

    /// The conditional log-likelihood of a feature, or `None` when the
    /// feature was never observed.
    pub fn log_likelihood(&self, class: usize, feature: usize) -> Option<f64> {
        let position = self.feature_indices.binary_search(&feature).ok()?;
        self.log_likelihoods.get(class).map(|row| row[position])
    }

    /// Joint log score of every class.
    pub fn predict_scores<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<Vec<f64>> {
        if features.dimension() != self.dimension {
            return Err(HashlearnError::dimension_mismatch(format!(
                "vector has dimension {}, model expects {}",
                features.dimension(),
                self.dimension
            )));
        }

        let observed: Vec<(usize, f64)> = features
            .active()
            .filter_map(|(index, value)| {
                self.feature_indices
                    .binary_search(&index)
                    .ok()
                    .map(|position| (position, value))
            })
            .collect();

        Ok(self
            .log_priors
            .iter()
            .zip(&self.log_likelihoods)
            .map(|(prior, row)| {
                prior
                    + observed
                        .iter()
                        .map(|(position, value)| value * row[*position])
                        .sum::<f64>()
            })
            .collect())
    }

    /// Index of the highest scoring class; ties go to the lowest index.
    pub fn predict_class<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<usize> {
        Ok(argmax(&self.predict_scores(features)?))
    }

    /// Label of the highest scoring class.
    pub fn predict<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<f64> {
        let class = self.predict_class(features)?;
        Ok(self.labels[class])
    }

    /// Posterior class probabilities.
    pub fn predict_probabilities<V: FeatureVector + ?Sized>(&self, features: &V) -> Result<Vec<f64>> {
        Ok(softmax(&self.predict_scores(features)?))
    }

    /// The predicted class and the posterior probabilities, scored once.
    pub fn predict_with_probabilities<V: FeatureVector + ?Sized>(
        &self,
        features: &V,
    ) -> Result<(usize, Vec<f64>)> {
        let scores = self.predict_scores(features)?;
        Ok((argmax(&scores), softmax(&scores)))
    }

    /// Write the model as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Read a model written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: NaiveBayesModel = serde_json::from_str(&fs::read_to_string(path)?)?;
        model.check_shape()?;
        Ok(model)
    }

    /// Check the internal arrays of a deserialized model.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(HashlearnError::invalid_argument(
                "Naive Bayes model has dimension 0",
            ));
        }
        let classes = self.labels.len();
        if classes == 0 || self.log_priors.len() != classes || self.log_likelihoods.len() != classes {
            return Err(HashlearnError::invalid_argument(
                "Naive Bayes model has inconsistent class arrays",
            ));
        }
        if self
            .log_likelihoods
            .iter()
            .any(|row| row.len() != self.feature_indices.len())
        {
            return Err(HashlearnError::invalid_argument(
                "Naive Bayes model has inconsistent feature arrays",
            ));
        }
        if self.feature_indices.windows(2).any(|pair| pair[0] >= pair[1])
            || self
                .feature_indices
                .last()
                .is_some_and(|&index| index >= self.dimension)
        {
            return Err(HashlearnError::invalid_argument(
                "Naive Bayes model feature indices are not sorted within its dimension",
            ));
        }
        Ok(())
    }
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (class, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = class;
        }
    }
    best
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let norm: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::sparse::SparseVector;

    fn point(label: f64, dense: &[f64]) -> LabeledVector {
        LabeledVector::from_dense(label, dense)
    }

    #[test]
    fn test_priors_and_likelihoods() {
        let data = vec![
            point(0.0, &[2.0, 0.0, 0.0]),
            point(0.0, &[1.0, 1.0, 0.0]),
            point(1.0, &[0.0, 0.0, 3.0]),
        ];
        let model = NaiveBayes::new(1.0).unwrap().train(&data).unwrap();

        assert_eq!(model.labels(), &[0.0, 1.0]);
        assert_eq!(model.log_priors()[0], (2.0f64 / 3.0).ln());
        assert_eq!(model.log_priors()[1], (1.0f64 / 3.0).ln());

        // class 0: feature sums [3, 1, 0], mass 4, denominator 4 + 3
        let expected = (4.0f64).ln() - (7.0f64).ln();
        assert!((model.log_likelihood(0, 0).unwrap() - expected).abs() < 1e-12);
        let expected = (1.0f64).ln() - (7.0f64).ln();
        assert!((model.log_likelihood(0, 2).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_predicts_majority_feature_class() {
        let data = vec![
            point(0.0, &[5.0, 0.0, 1.0]),
            point(0.0, &[4.0, 1.0, 0.0]),
            point(2.0, &[0.0, 6.0, 1.0]),
            point(2.0, &[1.0, 5.0, 0.0]),
        ];
        let model = NaiveBayes::default().train(&data).unwrap();

        assert_eq!(model.labels(), &[0.0, 2.0]);
        assert_eq!(
            model.predict(&SparseVector::from_dense(&[3.0, 0.0, 0.0])).unwrap(),
            0.0
        );
        assert_eq!(
            model.predict(&SparseVector::from_dense(&[0.0, 3.0, 0.0])).unwrap(),
            2.0
        );
        assert_eq!(
            model.predict_class(&SparseVector::from_dense(&[0.0, 3.0, 0.0])).unwrap(),
            1
        );
    }

    #[test]
    fn test_single_class_always_predicted() {
        let data = vec![point(3.0, &[1.0, 0.0]), point(3.0, &[0.0, 2.0])];
        let model = NaiveBayes::default().train(&data).unwrap();

        for query in [[0.0, 0.0], [9.0, 0.0], [0.0, 1.0]] {
            assert_eq!(model.predict(&SparseVector::from_dense(&query)).unwrap(), 3.0);
        }
    }

    #[test]
    fn test_tie_goes_to_lowest_class() {
        let data = vec![point(0.0, &[1.0, 0.0]), point(1.0, &[0.0, 1.0])];
        let model = NaiveBayes::default().train(&data).unwrap();

        let scores = model.predict_scores(&SparseVector::zeros(2)).unwrap();
        assert_eq!(scores[0], scores[1]);
        assert_eq!(model.predict_class(&SparseVector::zeros(2)).unwrap(), 0);
    }

    #[test]
    fn test_unobserved_features_contribute_nothing() {
        let data = vec![point(0.0, &[1.0, 0.0, 0.0]), point(1.0, &[0.0, 1.0, 0.0])];
        let model = NaiveBayes::default().train(&data).unwrap();

        assert_eq!(model.observed_features(), &[0, 1]);
        assert_eq!(model.log_likelihood(0, 2), None);

        let plain = model.predict_scores(&SparseVector::from_dense(&[1.0, 0.0, 0.0])).unwrap();
        let with_unseen = model
            .predict_scores(&SparseVector::from_dense(&[1.0, 0.0, 7.0]))
            .unwrap();
        assert_eq!(plain, with_unseen);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let data = vec![
            point(0.0, &[3.0, 1.0]),
            point(1.0, &[1.0, 3.0]),
            point(2.0, &[2.0, 2.0]),
        ];
        let model = NaiveBayes::default().train(&data).unwrap();
        let probabilities = model
            .predict_probabilities(&SparseVector::from_dense(&[40.0, 1.0]))
            .unwrap();

        assert_eq!(probabilities.len(), 3);
        assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probabilities[0] > probabilities[1]);
    }

    #[test]
    fn test_training_errors() {
        assert!(matches!(
            NaiveBayes::default().train(&[]),
            Err(HashlearnError::EmptyTrainingSet(_))
        ));
        assert!(matches!(
            NaiveBayes::new(0.0),
            Err(HashlearnError::InvalidHyperparameter(_))
        ));
        assert!(matches!(
            NaiveBayes::default().train(&[point(-1.0, &[1.0])]),
            Err(HashlearnError::InvalidArgument(_))
        ));
        assert!(matches!(
            NaiveBayes::default().train(&[point(0.5, &[1.0])]),
            Err(HashlearnError::InvalidArgument(_))
        ));
        assert!(matches!(
            NaiveBayes::default().train(&[point(0.0, &[-1.0])]),
            Err(HashlearnError::InvalidArgument(_))
        ));
        assert!(matches!(
            NaiveBayes::default().train(&[point(0.0, &[1.0]), point(1.0, &[1.0, 1.0])]),
            Err(HashlearnError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let model = NaiveBayes::default()
            .train(&[point(0.0, &[1.0, 1.0])])
            .unwrap();
        assert!(matches!(
            model.predict(&SparseVector::zeros(3)),
            Err(HashlearnError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let data = vec![
            point(0.0, &[0.3, 0.0, 1.7]),
            point(1.0, &[0.0, 2.9, 0.1]),
        ];
        let model = NaiveBayes::new(0.37).unwrap().train(&data).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nb.json");
        model.save(&path).unwrap();

        let loaded = NaiveBayesModel::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_single_scoring_matches_separate_predictions() {
        let data = vec![
            point(0.0, &[1.0, 0.0]),
            point(1.0, &[0.0, 1.0]),
            point(2.0, &[1.0, 1.0]),
        ];
        let model = NaiveBayes::default().train(&data).unwrap();

        for dense in [[1.0, 0.0], [0.0, 3.0], [0.0, 0.0]] {
            let features = SparseVector::from_dense(&dense);
            let (class, probabilities) = model.predict_with_probabilities(&features).unwrap();
            assert_eq!(class, model.predict_class(&features).unwrap());
            assert_eq!(probabilities, model.predict_probabilities(&features).unwrap());
        }
    }

    #[test]
    fn test_load_rejects_truncated_rows() {
        let model = NaiveBayes::default()
            .train(&[point(0.0, &[1.0, 0.0]), point(1.0, &[0.0, 1.0])])
            .unwrap();
        let mut value = serde_json::to_value(&model).unwrap();
        value["log_likelihoods"][1] = serde_json::json!([]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nb.json");
        fs::write(&path, value.to_string()).unwrap();

        assert!(matches!(
            NaiveBayesModel::load(&path),
            Err(HashlearnError::InvalidArgument(_))
        ));
    }
}
