//! Length filter implementation.
//!
//! Removes tokens shorter than a minimum number of characters. Empty tokens
//! and tokens marked as stopped by an earlier filter are removed as well, so
//! this filter also serves as the pipeline's cleanup step.
//!
//! # Examples
//!
//! ```
//! use hashlearn::analysis::token_filter::Filter;
//! use hashlearn::analysis::token_filter::length::LengthFilter;
//! use hashlearn::analysis::token::Token;
//!
//! let filter = LengthFilter::new(2);
//! let tokens = vec![Token::new("a", 0), Token::new("", 1), Token::new("ok", 2)];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).collect();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "ok");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;

/// Default minimum token length in characters.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 2;

/// A filter that removes short, empty and stopped tokens.
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min_length: usize,
}

impl LengthFilter {
    /// Create a filter keeping tokens of at least `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        LengthFilter { min_length }
    }

    /// Minimum token length in characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_LENGTH)
    }
}

impl Filter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> TokenStream {
        let min_length = self.min_length;
        Box::new(tokens.filter(move |token| {
            !token.is_stopped() && !token.is_empty() && token.char_len() >= min_length
        }))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}
