//! Documents, labeled vectors and train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::feature::sparse::{FeatureVector, SparseVector};

/// Split name of the training portion of a corpus.
pub const TRAIN_SPLIT: &str = "train";

/// Split name of the evaluation portion of a corpus.
pub const TEST_SPLIT: &str = "test";

/// A raw text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source path or stream offset.
    pub id: String,
    /// Raw text.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        Document {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A document with its category and, when known, the split it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDocument {
    pub document: Document,
    pub category: String,
    pub split: Option<String>,
}

impl LabeledDocument {
    /// Create a labeled document without a split.
    pub fn new<C: Into<String>>(document: Document, category: C) -> Self {
        LabeledDocument {
            document,
            category: category.into(),
            split: None,
        }
    }

    /// Set the split name.
    pub fn with_split<S: Into<String>>(mut self, split: S) -> Self {
        self.split = Some(split.into());
        self
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        &self.document.id
    }

    /// The raw text.
    pub fn text(&self) -> &str {
        &self.document.text
    }
}

/// A feature vector paired with a real-valued label.
///
/// Classification labels are dense class ids stored as `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledVector {
    pub label: f64,
    pub features: SparseVector,
}

impl LabeledVector {
    /// Create a new labeled vector.
    pub fn new(label: f64, features: SparseVector) -> Self {
        LabeledVector { label, features }
    }

    /// Create a labeled vector from dense feature values.
    pub fn from_dense(label: f64, features: &[f64]) -> Self {
        LabeledVector {
            label,
            features: SparseVector::from_dense(features),
        }
    }

    /// Dimension of the feature vector.
    pub fn dimension(&self) -> usize {
        self.features.dimension()
    }
}

/// Randomly partition `items` into `(train, test)`.
///
/// `round(len * test_fraction)` items go to the test side. The same seed
/// always yields the same partition, and both sides keep the input order.
pub fn random_split<T>(items: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let test_size = ((items.len() as f64) * test_fraction).round() as usize;
    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut is_test = vec![false; items.len()];
    for &position in order.iter().take(test_size) {
        is_test[position] = true;
    }

    let mut train = Vec::with_capacity(items.len() - test_size.min(items.len()));
    let mut test = Vec::with_capacity(test_size);
    for (item, test_side) in items.into_iter().zip(is_test) {
        if test_side {
            test.push(item);
        } else {
            train.push(item);
        }
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_split_sizes() {
        let items: Vec<usize> = (0..10).collect();
        let (train, test) = random_split(items, 0.3, 7);

        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert!(train.windows(2).all(|w| w[0] < w[1]));
        assert!(test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_random_split_is_seeded() {
        let items: Vec<usize> = (0..50).collect();
        let first = random_split(items.clone(), 0.25, 42);
        let second = random_split(items, 0.25, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_fraction_keeps_everything() {
        let (train, test) = random_split(vec!["a", "b"], 0.0, 1);
        assert_eq!(train, vec!["a", "b"]);
        assert!(test.is_empty());
    }

    #[test]
    fn test_labeled_document() {
        let doc = LabeledDocument::new(Document::new("a/b.txt", "text"), "sci.space")
            .with_split(TRAIN_SPLIT);
        assert_eq!(doc.id(), "a/b.txt");
        assert_eq!(doc.text(), "text");
        assert_eq!(doc.split.as_deref(), Some("train"));
    }

    #[test]
    fn test_labeled_vector_from_dense() {
        let point = LabeledVector::from_dense(1.5, &[0.0, 2.0]);
        assert_eq!(point.dimension(), 2);
        assert_eq!(point.features.indices(), &[1]);
    }
}
