//! Rare term filtering.
//!
//! Rare terms are computed in two phases. A [`RareTermCollector`] first counts
//! how often every term occurs across the whole training corpus; only after
//! that pass completes does [`RareTermCollector::finish`] produce the
//! [`RareTerms`] set used by [`RareTermFilter`]. No document can be finally
//! tokenized before the set exists.
//!
//! The threshold is global: a term's count is summed over all documents
//! regardless of their class.
//!
//! # Examples
//!
//! ```
//! use hashlearn::analysis::token_filter::Filter;
//! use hashlearn::analysis::token_filter::rare::{RareTermCollector, RareTermFilter};
//! use hashlearn::analysis::token::Token;
//!
//! let mut collector = RareTermCollector::new(2);
//! collector.observe(["hockey", "puck", "hockey"]);
//! let rare = collector.finish();
//! assert!(rare.contains("puck"));
//!
//! let filter = RareTermFilter::new(rare);
//! let tokens = vec![Token::new("hockey", 0), Token::new("puck", 1)];
//! let kept: Vec<_> = filter.filter(Box::new(tokens.into_iter())).collect();
//! assert_eq!(kept.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;

/// Default minimum corpus-wide occurrence count for a term to be kept.
pub const DEFAULT_MIN_TERM_COUNT: usize = 2;

/// The set of terms occurring fewer than the minimum count in a corpus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RareTerms {
    min_count: usize,
    terms: BTreeSet<String>,
}

impl RareTerms {
    /// An empty set; nothing is considered rare.
    pub fn empty() -> Self {
        RareTerms::default()
    }

    /// Check whether a term is rare.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Number of rare terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if no term is rare.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The count threshold this set was computed with.
    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Iterate over the rare terms in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Accumulates corpus-wide term occurrence counts.
#[derive(Clone, Debug)]
pub struct RareTermCollector {
    min_count: usize,
    counts: AHashMap<String, usize>,
}

impl RareTermCollector {
    /// Create a collector flagging terms seen fewer than `min_count` times.
    pub fn new(min_count: usize) -> Self {
        RareTermCollector {
            min_count,
            counts: AHashMap::new(),
        }
    }

    /// Count every term of one document.
    pub fn observe<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref();
            if let Some(count) = self.counts.get_mut(term) {
                *count += 1;
            } else {
                self.counts.insert(term.to_string(), 1);
            }
        }
    }

    /// Merge the counts of another collector into this one.
    pub fn merge(mut self, other: RareTermCollector) -> Self {
        for (term, count) in other.counts {
            *self.counts.entry(term).or_insert(0) += count;
        }
        self
    }

    /// Number of distinct terms seen so far.
    pub fn vocabulary_size(&self) -> usize {
        self.counts.len()
    }

    /// Total occurrences of a term seen so far.
    pub fn count(&self, term: &str) -> usize {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Close the aggregation and produce the rare term set.
    pub fn finish(self) -> RareTerms {
        let min_count = self.min_count;
        let terms = self
            .counts
            .into_iter()
            .filter(|(_, count)| *count < min_count)
            .map(|(term, _)| term)
            .collect();

        RareTerms { min_count, terms }
    }

    /// Count the terms `analyzer` emits for every text in parallel and
    /// return the rare term set.
    pub fn from_corpus<A, T>(analyzer: &A, texts: &[T], min_count: usize) -> RareTerms
    where
        A: Analyzer + ?Sized,
        T: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .fold(
                || RareTermCollector::new(min_count),
                |mut collector, text| {
                    collector.observe(analyzer.analyze(text.as_ref()).map(|token| token.text));
                    collector
                },
            )
            .reduce(|| RareTermCollector::new(min_count), RareTermCollector::merge)
            .finish()
    }
}

/// A filter that removes terms contained in a [`RareTerms`] set.
#[derive(Clone, Debug)]
pub struct RareTermFilter {
    rare_terms: Arc<RareTerms>,
}

impl RareTermFilter {
    /// Create a filter for the given rare term set.
    pub fn new(rare_terms: RareTerms) -> Self {
        Self::from_shared(Arc::new(rare_terms))
    }

    /// Create a filter sharing an existing rare term set.
    pub fn from_shared(rare_terms: Arc<RareTerms>) -> Self {
        RareTermFilter { rare_terms }
    }

    /// The rare term set used by this filter.
    pub fn rare_terms(&self) -> &RareTerms {
        &self.rare_terms
    }
}

impl Filter for RareTermFilter {
    fn filter(&self, tokens: TokenStream) -> TokenStream {
        let rare_terms = Arc::clone(&self.rare_terms);
        Box::new(tokens.filter(move |token| !rare_terms.contains(&token.text)))
    }

    fn name(&self) -> &'static str {
        "rare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StandardAnalyzer;
    use crate::analysis::token::Token;

    #[test]
    fn test_collector_threshold() {
        let mut collector = RareTermCollector::new(2);
        collector.observe(["goal", "puck", "goal"]);
        collector.observe(["orbit", "puck"]);

        assert_eq!(collector.count("goal"), 2);
        assert_eq!(collector.vocabulary_size(), 3);

        let rare = collector.finish();
        assert_eq!(rare.iter().collect::<Vec<_>>(), vec!["orbit"]);
        assert_eq!(rare.min_count(), 2);
    }

    #[test]
    fn test_min_count_of_one_flags_nothing() {
        let mut collector = RareTermCollector::new(1);
        collector.observe(["once"]);
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut left = RareTermCollector::new(3);
        left.observe(["shared", "left"]);
        let mut right = RareTermCollector::new(3);
        right.observe(["shared", "shared", "right"]);

        let merged = left.merge(right);
        assert_eq!(merged.count("shared"), 3);

        let rare = merged.finish();
        assert!(!rare.contains("shared"));
        assert!(rare.contains("left"));
        assert!(rare.contains("right"));
    }

    #[test]
    fn test_from_corpus_matches_sequential_counting() {
        let analyzer = StandardAnalyzer::new();
        let texts = vec![
            "Orbit launch orbit".to_string(),
            "launch window".to_string(),
            "hockey".to_string(),
        ];

        let rare = RareTermCollector::from_corpus(&analyzer, &texts, 2);
        assert_eq!(rare.iter().collect::<Vec<_>>(), vec!["hockey", "window"]);
    }

    #[test]
    fn test_rare_filter() {
        let mut collector = RareTermCollector::new(2);
        collector.observe(["common", "common", "rare"]);
        let filter = RareTermFilter::new(collector.finish());

        let tokens = vec![
            Token::new("common", 0),
            Token::new("rare", 1),
            Token::new("unseen", 2),
        ];
        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .map(|t| t.text)
            .collect();

        // Terms absent from the fitting corpus are not rare.
        assert_eq!(result, vec!["common", "unseen"]);
        assert_eq!(filter.name(), "rare");
    }
}
