//! Inverse document frequency estimation.
//!
//! Fitting is a barrier: document frequencies are aggregated over the whole
//! training corpus before any weight exists. Weights are then immutable and
//! can be shared across threads; refitting produces a new [`IdfWeights`].
//!
//! For every feature present in at least one document,
//! `weight = ln((N + 1) / (df + 1))` where `N` is the number of documents and
//! `df` the number of documents with a non-zero entry for the feature.
//!
//! # Examples
//!
//! ```
//! use hashlearn::feature::idf::IdfEstimator;
//! use hashlearn::feature::sparse::{FeatureVector, SparseVector};
//!
//! let corpus = vec![
//!     SparseVector::new(4, vec![0, 1], vec![1.0, 2.0]).unwrap(),
//!     SparseVector::new(4, vec![0], vec![3.0]).unwrap(),
//! ];
//! let weights = IdfEstimator::new().fit(&corpus).unwrap();
//!
//! // feature 0 occurs everywhere and carries no weight
//! assert_eq!(weights.weight(0), Some(0.0));
//!
//! let tfidf = weights.transform(&corpus[0]).unwrap();
//! assert_eq!(tfidf.get(1), 2.0 * (3.0f64 / 2.0).ln());
//! ```

use std::time::Instant;

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HashlearnError, Result};
use crate::feature::sparse::{FeatureVector, SparseVector};

/// Fits [`IdfWeights`] from a corpus of term frequency vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdfEstimator {
    min_doc_freq: usize,
}

impl IdfEstimator {
    /// Create an estimator keeping every observed feature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give weight 0 to features present in fewer than `min_doc_freq` documents.
    pub fn with_min_doc_freq(mut self, min_doc_freq: usize) -> Self {
        self.min_doc_freq = min_doc_freq;
        self
    }

    /// The minimum document frequency.
    pub fn min_doc_freq(&self) -> usize {
        self.min_doc_freq
    }

    /// Aggregate document frequencies over `documents` and compute weights.
    pub fn fit<V>(&self, documents: &[V]) -> Result<IdfWeights>
    where
        V: FeatureVector + Sync,
    {
        let first = documents.first().ok_or_else(|| {
            HashlearnError::empty_training_set("cannot fit IDF on an empty corpus")
        })?;
        let dimension = first.dimension();

        if let Some((position, other)) = documents
            .iter()
            .enumerate()
            .find(|(_, doc)| doc.dimension() != dimension)
        {
            return Err(HashlearnError::dimension_mismatch(format!(
                "document {position} has dimension {}, expected {dimension}",
                other.dimension()
            )));
        }

        let start = Instant::now();
        let counts = documents
            .par_iter()
            .fold(AHashMap::new, |mut counts: AHashMap<usize, u64>, doc| {
                for (index, value) in doc.active() {
                    if value != 0.0 {
                        *counts.entry(index).or_insert(0) += 1;
                    }
                }
                counts
            })
            .reduce(AHashMap::new, |mut left, right| {
                for (index, count) in right {
                    *left.entry(index).or_insert(0) += count;
                }
                left
            });

        let mut frequencies: Vec<(usize, u64)> = counts.into_iter().collect();
        frequencies.sort_unstable_by_key(|(index, _)| *index);

        let num_docs = documents.len() as u64;
        let mut indices = Vec::with_capacity(frequencies.len());
        let mut document_frequencies = Vec::with_capacity(frequencies.len());
        let mut weights = Vec::with_capacity(frequencies.len());
        for (index, df) in frequencies {
            let weight = if (df as usize) < self.min_doc_freq {
                0.0
            } else {
                ((num_docs as f64 + 1.0) / (df as f64 + 1.0)).ln()
            };
            indices.push(index);
            document_frequencies.push(df);
            weights.push(weight);
        }

        debug!(
            "fitted IDF over {} documents, {} features in {:?}",
            num_docs,
            indices.len(),
            start.elapsed()
        );

        Ok(IdfWeights {
            dimension,
            num_docs,
            indices,
            document_frequencies,
            weights,
        })
    }
}

/// Per-feature IDF weights for the features observed during fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdfWeights {
    dimension: usize,
    num_docs: u64,
    indices: Vec<usize>,
    document_frequencies: Vec<u64>,
    weights: Vec<f64>,
}

impl IdfWeights {
    /// Dimension of the vectors the weights were fitted on.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of documents in the fitting corpus.
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Number of features carrying a weight.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if no feature carries a weight.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn position(&self, index: usize) -> Option<usize> {
        self.indices.binary_search(&index).ok()
    }

    /// The weight of a feature, or `None` if it never occurred.
    pub fn weight(&self, index: usize) -> Option<f64> {
        self.position(index).map(|p| self.weights[p])
    }

    /// The number of fitting documents containing a feature.
    pub fn document_frequency(&self, index: usize) -> u64 {
        self.position(index)
            .map_or(0, |p| self.document_frequencies[p])
    }

    /// Check the internal arrays of deserialized weights.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(HashlearnError::invalid_argument("IDF weights have dimension 0"));
        }
        if self.document_frequencies.len() != self.indices.len()
            || self.weights.len() != self.indices.len()
        {
            return Err(HashlearnError::invalid_argument(
                "IDF weights have inconsistent arrays",
            ));
        }
        if self.indices.windows(2).any(|pair| pair[0] >= pair[1])
            || self.indices.last().is_some_and(|&index| index >= self.dimension)
        {
            return Err(HashlearnError::invalid_argument(
                "IDF feature indices are not sorted within the dimension",
            ));
        }
        if self.weights.iter().any(|weight| !weight.is_finite()) {
            return Err(HashlearnError::invalid_argument("IDF weights are not finite"));
        }
        Ok(())
    }

    /// Multiply a term frequency vector by the weights.
    ///
    /// Features without a weight are dropped. Features with weight 0 are kept
    /// with value 0.
    pub fn transform<V: FeatureVector + ?Sized>(&self, tf: &V) -> Result<SparseVector> {
        if tf.dimension() != self.dimension {
            return Err(HashlearnError::dimension_mismatch(format!(
                "vector has dimension {}, IDF weights have {}",
                tf.dimension(),
                self.dimension
            )));
        }

        let mut indices = Vec::with_capacity(tf.nnz());
        let mut values = Vec::with_capacity(tf.nnz());
        for (index, value) in tf.active() {
            if let Some(weight) = self.weight(index) {
                indices.push(index);
                values.push(value * weight);
            }
        }

        SparseVector::new(self.dimension, indices, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(dimension: usize, entries: &[(usize, f64)]) -> SparseVector {
        let (indices, values) = entries.iter().copied().unzip();
        SparseVector::new(dimension, indices, values).unwrap()
    }

    fn corpus() -> Vec<SparseVector> {
        vec![
            vector(8, &[(0, 1.0), (1, 1.0), (2, 1.0)]),
            vector(8, &[(0, 2.0), (1, 1.0)]),
            vector(8, &[(0, 1.0), (5, 4.0)]),
        ]
    }

    #[test]
    fn test_weights() {
        let weights = IdfEstimator::new().fit(&corpus()).unwrap();

        assert_eq!(weights.num_docs(), 3);
        assert_eq!(weights.dimension(), 8);
        assert_eq!(weights.len(), 4);
        assert_eq!(weights.document_frequency(0), 3);
        assert_eq!(weights.document_frequency(1), 2);
        assert_eq!(weights.document_frequency(7), 0);

        assert_eq!(weights.weight(0), Some(0.0));
        assert_eq!(weights.weight(1), Some((4.0f64 / 3.0).ln()));
        assert_eq!(weights.weight(2), Some(2.0f64.ln()));
        assert_eq!(weights.weight(7), None);
    }

    #[test]
    fn test_weight_decreases_with_document_frequency() {
        let weights = IdfEstimator::new().fit(&corpus()).unwrap();
        let rare = weights.weight(2).unwrap();
        let common = weights.weight(1).unwrap();
        let everywhere = weights.weight(0).unwrap();

        assert!(rare > common);
        assert!(common > everywhere);
        assert_eq!(everywhere, 0.0);
    }

    #[test]
    fn test_transform_drops_unknown_indices() {
        let weights = IdfEstimator::new().fit(&corpus()).unwrap();
        let tf = vector(8, &[(0, 2.0), (2, 3.0), (6, 1.0)]);

        let tfidf = weights.transform(&tf).unwrap();
        assert_eq!(tfidf.indices(), &[0, 2]);
        assert_eq!(tfidf.values(), &[0.0, 3.0 * 2.0f64.ln()]);
    }

    #[test]
    fn test_transform_is_repeatable() {
        let weights = IdfEstimator::new().fit(&corpus()).unwrap();
        let tf = vector(8, &[(1, 3.0), (5, 2.0)]);

        let first = weights.transform(&tf).unwrap();
        let second = weights.transform(&tf).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_min_doc_freq_zeroes_rare_features() {
        let weights = IdfEstimator::new()
            .with_min_doc_freq(2)
            .fit(&corpus())
            .unwrap();

        assert_eq!(weights.weight(2), Some(0.0));
        assert_eq!(weights.weight(5), Some(0.0));
        assert!(weights.weight(1).unwrap() > 0.0);

        let tfidf = weights.transform(&vector(8, &[(2, 1.0)])).unwrap();
        assert_eq!(tfidf.indices(), &[2]);
        assert_eq!(tfidf.values(), &[0.0]);
    }

    #[test]
    fn test_empty_corpus() {
        let empty: Vec<SparseVector> = Vec::new();
        assert!(matches!(
            IdfEstimator::new().fit(&empty),
            Err(HashlearnError::EmptyTrainingSet(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mixed = vec![vector(8, &[(0, 1.0)]), vector(4, &[(0, 1.0)])];
        assert!(matches!(
            IdfEstimator::new().fit(&mixed),
            Err(HashlearnError::DimensionMismatch(_))
        ));

        let weights = IdfEstimator::new().fit(&corpus()).unwrap();
        assert!(weights.transform(&vector(4, &[(0, 1.0)])).is_err());
    }

    #[test]
    fn test_explicit_zero_entries_do_not_count() {
        let docs = vec![vector(4, &[(0, 0.0), (1, 1.0)]), vector(4, &[(1, 1.0)])];
        let weights = IdfEstimator::new().fit(&docs).unwrap();
        assert_eq!(weights.weight(0), None);
        assert_eq!(weights.document_frequency(1), 2);
    }

    #[test]
    fn test_check_shape_rejects_inconsistent_arrays() {
        let weights = IdfEstimator::new().fit(&corpus()).unwrap();
        assert!(weights.check_shape().is_ok());

        let mut truncated = weights.clone();
        truncated.weights.pop();
        assert!(matches!(
            truncated.check_shape(),
            Err(HashlearnError::InvalidArgument(_))
        ));

        let mut out_of_range = weights.clone();
        out_of_range.dimension = 4;
        assert!(out_of_range.check_shape().is_err());

        let mut empty_space = weights;
        empty_space.dimension = 0;
        assert!(empty_space.check_shape().is_err());
    }
}
