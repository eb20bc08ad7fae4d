//! # Hashlearn
//!
//! Text classification and streaming regression over hashed sparse features.
//!
//! ## Features
//!
//! - Configurable text analysis (tokenizer and token filter chains)
//! - Feature hashing with MurmurHash3 and IDF weighting
//! - Multinomial Naive Bayes with additive smoothing
//! - Streaming linear regression trained by mini-batch SGD
//! - Multiclass and regression evaluation metrics
//! - A parallel batch pipeline from a labeled corpus to a trained classifier

pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod feature;
pub mod ml;
pub mod pipeline;
pub mod stream;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
