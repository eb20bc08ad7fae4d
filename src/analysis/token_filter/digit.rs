//! Digit filter implementation.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;

/// A filter that drops every token containing a digit.
///
/// Any Unicode numeric character counts, so `"2nd"`, `"mp3"` and `"٣"` are all
/// removed.
#[derive(Clone, Debug, Default)]
pub struct DigitFilter;

impl DigitFilter {
    /// Create a new digit filter.
    pub fn new() -> Self {
        DigitFilter
    }

    /// Check whether a term contains a digit.
    pub fn contains_digit(text: &str) -> bool {
        text.chars().any(char::is_numeric)
    }
}

impl Filter for DigitFilter {
    fn filter(&self, tokens: TokenStream) -> TokenStream {
        Box::new(tokens.filter(|token| !Self::contains_digit(&token.text)))
    }

    fn name(&self) -> &'static str {
        "digit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_digit_filter() {
        let filter = DigitFilter::new();
        let tokens = vec![
            Token::new("alpha", 0),
            Token::new("2nd", 1),
            Token::new("mp3", 2),
            Token::new("1999", 3),
            Token::new("beta", 4),
        ];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_non_ascii_digits() {
        assert!(DigitFilter::contains_digit("٣"));
        assert!(!DigitFilter::contains_digit("naïve"));
    }
}
