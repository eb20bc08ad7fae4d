//! Core analyzer trait definition.
//!
//! Analyzers combine a tokenizer and filters into the complete text
//! processing pipeline:
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Feature Hasher
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 … Filter N
//! ```
//!
//! # Examples
//!
//! ```
//! use hashlearn::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let terms = analyzer.terms("The Quick brown fox, 2 times!");
//!
//! assert_eq!(terms, vec!["quick", "brown", "fox", "times"]);
//! ```

use crate::analysis::token::TokenStream;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analysis never fails. Implementations must be deterministic: analyzing the
/// same text twice yields identical output.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> TokenStream;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and collect the retained terms in order.
    ///
    /// Duplicates are preserved; term frequency is derived later.
    fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).map(|token| token.text).collect()
    }
}
