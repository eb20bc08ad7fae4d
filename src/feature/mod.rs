//! Feature extraction: sparse vectors, the hashing trick and IDF weighting.

pub mod hashing;
pub mod idf;
pub mod sparse;

pub use hashing::HashingTf;
pub use idf::{IdfEstimator, IdfWeights};
pub use sparse::{FeatureVector, SparseVector, SparseVectorBuilder};
