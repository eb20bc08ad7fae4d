//! Token filter implementations for token transformation.
//!
//! Filters are applied in sequence by an analyzer. Each filter consumes a
//! stream and returns a new one; a filter drops tokens by omitting them from
//! its output.

use crate::analysis::token::TokenStream;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> TokenStream;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod digit;
pub mod length;
pub mod lowercase;
pub mod rare;
pub mod stop;

pub use digit::DigitFilter;
pub use length::LengthFilter;
pub use lowercase::LowercaseFilter;
pub use rare::RareTermFilter;
pub use stop::StopFilter;
