//! Sparse feature vectors.
//!
//! A [`SparseVector`] stores its non-zero entries as a strictly increasing
//! index array with a parallel value array. Vectors are read through the
//! [`FeatureVector`] trait; they are built either directly from validated
//! arrays or incrementally through a [`SparseVectorBuilder`], which sums
//! repeated contributions to the same index.
//!
//! # Examples
//!
//! ```
//! use hashlearn::feature::sparse::{FeatureVector, SparseVectorBuilder};
//!
//! let mut builder = SparseVectorBuilder::new(8);
//! builder.add(5, 1.0);
//! builder.add(2, 1.0);
//! builder.add(5, 1.0);
//!
//! let vector = builder.build();
//! assert_eq!(vector.indices(), &[2, 5]);
//! assert_eq!(vector.get(5), 2.0);
//! assert_eq!(vector.dot(&[1.0; 8]), 3.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HashlearnError, Result};

/// Read-only access to a feature vector of fixed dimension.
pub trait FeatureVector {
    /// The dimension of the feature space.
    fn dimension(&self) -> usize;

    /// Number of stored entries.
    fn nnz(&self) -> usize;

    /// Value at `index`, zero when the index is not stored.
    fn get(&self, index: usize) -> f64;

    /// Iterate over stored `(index, value)` pairs in increasing index order.
    fn active(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_>;

    /// Dot product with a dense vector.
    ///
    /// Stored indices beyond the length of `dense` are ignored.
    fn dot(&self, dense: &[f64]) -> f64 {
        self.active()
            .filter_map(|(index, value)| dense.get(index).map(|w| w * value))
            .sum()
    }
}

/// A sparse vector with sorted indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Create a sparse vector from parallel index and value arrays.
    ///
    /// Indices must be strictly increasing and smaller than `dimension`.
    pub fn new(dimension: usize, indices: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(HashlearnError::dimension_mismatch(format!(
                "{} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        if let Some(pair) = indices.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(HashlearnError::invalid_argument(format!(
                "indices must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }
        if let Some(&last) = indices.last() {
            if last >= dimension {
                return Err(HashlearnError::dimension_mismatch(format!(
                    "index {last} out of range for dimension {dimension}"
                )));
            }
        }

        Ok(SparseVector {
            dimension,
            indices,
            values,
        })
    }

    /// An all-zero vector.
    pub fn zeros(dimension: usize) -> Self {
        SparseVector {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Convert a dense slice, storing only its non-zero entries.
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(index, value)| (index, *value))
            .unzip();

        SparseVector {
            dimension: dense.len(),
            indices,
            values,
        }
    }

    /// Stored indices in increasing order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Stored values, parallel to [`indices`](Self::indices).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum of the stored values.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (&index, &value) in self.indices.iter().zip(&self.values) {
            dense[index] = value;
        }
        dense
    }

    /// Return a vector with the same indices and every value mapped.
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> SparseVector {
        SparseVector {
            dimension: self.dimension,
            indices: self.indices.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Consume the vector into its index and value arrays.
    pub fn into_parts(self) -> (usize, Vec<usize>, Vec<f64>) {
        (self.dimension, self.indices, self.values)
    }
}

impl FeatureVector for SparseVector {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn nnz(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(position) => self.values[position],
            Err(_) => 0.0,
        }
    }

    fn active(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        Box::new(self.indices.iter().copied().zip(self.values.iter().copied()))
    }
}

/// Accumulates contributions into a sparse vector.
///
/// Adding to an index that already holds a value sums the two.
#[derive(Debug, Clone)]
pub struct SparseVectorBuilder {
    dimension: usize,
    entries: BTreeMap<usize, f64>,
}

impl SparseVectorBuilder {
    /// Create an empty builder for the given dimension.
    pub fn new(dimension: usize) -> Self {
        SparseVectorBuilder {
            dimension,
            entries: BTreeMap::new(),
        }
    }

    /// The dimension of the vector being built.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add `value` to the entry at `index`.
    ///
    /// Indices outside the dimension are ignored.
    pub fn add(&mut self, index: usize, value: f64) -> &mut Self {
        if index < self.dimension {
            *self.entries.entry(index).or_insert(0.0) += value;
        }
        self
    }

    /// Number of distinct indices accumulated so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize the accumulated entries as a sparse vector.
    pub fn build(self) -> SparseVector {
        let (indices, values) = self.entries.into_iter().unzip();
        SparseVector {
            dimension: self.dimension,
            indices,
            values,
        }
    }
}
