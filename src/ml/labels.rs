//! Encoding of category names as dense class ids.
//!
//! Categories are ordered by descending frequency, ties broken
//! lexicographically, so the most common category gets id 0.
//!
//! # Examples
//!
//! ```
//! use hashlearn::ml::labels::LabelIndexer;
//!
//! let indexer = LabelIndexer::fit(["hockey", "space", "hockey", "autos"]).unwrap();
//!
//! assert_eq!(indexer.index_of("hockey"), Some(0));
//! assert_eq!(indexer.index_of("autos"), Some(1));
//! assert_eq!(indexer.label_of(2), Some("space"));
//! ```

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HashlearnError, Result};

/// Maps category names to class ids and back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredLabels", into = "StoredLabels")]
pub struct LabelIndexer {
    labels: Vec<String>,
    index: AHashMap<String, usize>,
}

/// Persisted form; the lookup table is rebuilt on load.
#[derive(Clone, Serialize, Deserialize)]
struct StoredLabels {
    labels: Vec<String>,
}

impl From<StoredLabels> for LabelIndexer {
    fn from(stored: StoredLabels) -> Self {
        LabelIndexer::from_labels(stored.labels)
    }
}

impl From<LabelIndexer> for StoredLabels {
    fn from(indexer: LabelIndexer) -> Self {
        StoredLabels {
            labels: indexer.labels,
        }
    }
}

impl PartialEq for LabelIndexer {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl Eq for LabelIndexer {}

impl LabelIndexer {
    /// Build the encoding from every occurrence of every category.
    pub fn fit<I, S>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: AHashMap<String, usize> = AHashMap::new();
        for category in categories {
            *counts.entry(category.as_ref().to_string()).or_insert(0) += 1;
        }
        if counts.is_empty() {
            return Err(HashlearnError::empty_training_set(
                "no categories to index",
            ));
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|(a, count_a), (b, count_b)| count_b.cmp(count_a).then_with(|| a.cmp(b)));

        Ok(Self::from_labels(ranked.into_iter().map(|(label, _)| label).collect()))
    }

    /// Rebuild an indexer from an ordered label list.
    pub fn from_labels(labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();
        LabelIndexer { labels, index }
    }

    /// The class id of a category.
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.index.get(category).copied()
    }

    /// The category of a class id.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Categories ordered by class id.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The class id of a category, failing for unknown categories.
    pub fn encode(&self, category: &str) -> Result<f64> {
        self.index_of(category).map(|id| id as f64).ok_or_else(|| {
            HashlearnError::invalid_argument(format!("unknown category '{category}'"))
        })
    }

    /// The category of a predicted label.
    pub fn decode(&self, label: f64) -> Result<&str> {
        if label.is_finite() && label >= 0.0 && label.fract() == 0.0 {
            if let Some(category) = self.label_of(label as usize) {
                return Ok(category);
            }
        }
        Err(HashlearnError::invalid_argument(format!(
            "label {label} does not name a category"
        )))
    }
}
