//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{HashlearnError, Result};

/// Pattern splitting text on runs of non-word characters.
pub const NON_WORD_PATTERN: &str = r"\W+";

/// A regex-based tokenizer.
///
/// In gap mode (the default) the pattern describes separators and the text
/// between matches becomes tokens. Empty gaps are never emitted.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to split or extract tokens
    pattern: Arc<Regex>,
    /// Whether to extract gaps (text between matches) instead of matches
    gaps: bool,
}

impl RegexTokenizer {
    /// Create a tokenizer that splits on runs of non-word characters.
    pub fn new() -> Result<Self> {
        Self::with_gaps(NON_WORD_PATTERN)
    }

    /// Create a tokenizer that emits the matches of a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(Self::compile(pattern)?),
            gaps: false,
        })
    }

    /// Create a tokenizer that emits the text between matches of a pattern.
    pub fn with_gaps(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(Self::compile(pattern)?),
            gaps: true,
        })
    }

    fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
            .map_err(|e| HashlearnError::invalid_argument(format!("Invalid regex pattern: {e}")))
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check if this tokenizer extracts gaps.
    pub fn gaps(&self) -> bool {
        self.gaps
    }

    fn split_gaps(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut last_end = 0;

        for mat in self.pattern.find_iter(text) {
            if mat.start() > last_end {
                tokens.push(Token::with_offsets(
                    &text[last_end..mat.start()],
                    tokens.len(),
                    last_end,
                    mat.start(),
                ));
            }
            last_end = mat.end();
        }

        if last_end < text.len() {
            tokens.push(Token::with_offsets(
                &text[last_end..],
                tokens.len(),
                last_end,
                text.len(),
            ));
        }

        tokens
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        RegexTokenizer {
            pattern: Arc::new(Regex::new(NON_WORD_PATTERN).expect("static pattern is valid")),
            gaps: true,
        }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> TokenStream {
        let tokens = if self.gaps {
            self.split_gaps(text)
        } else {
            self.pattern
                .find_iter(text)
                .enumerate()
                .map(|(position, mat)| {
                    Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
                })
                .collect()
        };

        Box::new(tokens.into_iter())
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokenizer: &RegexTokenizer, text: &str) -> Vec<String> {
        tokenizer.tokenize(text).map(|t| t.text).collect()
    }

    #[test]
    fn test_split_on_non_word_runs() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("hello,  world!").collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 5);

        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 8);
        assert_eq!(tokens[1].end_offset, 13);
    }

    #[test]
    fn test_empty_and_punctuation_only_input() {
        let tokenizer = RegexTokenizer::new().unwrap();
        assert!(texts(&tokenizer, "").is_empty());
        assert!(texts(&tokenizer, "?!... --").is_empty());
    }

    #[test]
    fn test_word_characters_are_kept_together() {
        let tokenizer = RegexTokenizer::new().unwrap();
        assert_eq!(
            texts(&tokenizer, "snake_case r2d2 naïve"),
            vec!["snake_case", "r2d2", "naïve"]
        );
    }

    #[test]
    fn test_match_mode() {
        let tokenizer = RegexTokenizer::with_pattern(r"[a-z]+").unwrap();
        assert_eq!(texts(&tokenizer, "abc 123 def"), vec!["abc", "def"]);
        assert!(!tokenizer.gaps());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexTokenizer::with_gaps("(").is_err());
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(RegexTokenizer::default().name(), "regex");
        assert_eq!(RegexTokenizer::default().pattern(), NON_WORD_PATTERN);
    }
}
