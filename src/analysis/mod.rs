//! Text analysis: tokenization and token filtering.
//!
//! Documents become term sequences through an [`Analyzer`], which runs a
//! [`Tokenizer`] followed by a chain of [`Filter`]s. The resulting terms are
//! fed to the feature hasher.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer, StandardAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::{RegexTokenizer, Tokenizer};
