//! Term frequency vectors through the hashing trick.
//!
//! Every term is hashed with MurmurHash3 (x86, 32-bit, seed 42) over its
//! UTF-8 bytes; the signed hash is reduced to a feature index in
//! `[0, num_features)` with a non-negative modulo. Distinct terms may share
//! an index, in which case their counts are summed.
//!
//! The hash is part of the persisted model format: bundles trained with one
//! hash function cannot be read with another.
//!
//! # Examples
//!
//! ```
//! use hashlearn::feature::hashing::HashingTf;
//! use hashlearn::feature::sparse::FeatureVector;
//!
//! let hashing = HashingTf::new(1 << 10).unwrap();
//! let tf = hashing.transform(["puck", "goal", "puck"]);
//!
//! assert_eq!(tf.get(hashing.index_of("puck")), 2.0);
//! assert_eq!(tf.sum(), 3.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{HashlearnError, Result};
use crate::feature::sparse::{SparseVector, SparseVectorBuilder};

/// Default feature space dimension (2^18).
pub const DEFAULT_NUM_FEATURES: usize = 1 << 18;

/// Seed of the term hash.
pub const HASH_SEED: u32 = 42;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

#[inline]
fn fmix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// MurmurHash3 x86 32-bit.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;
    let mut blocks = data.chunks_exact(4);

    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k1 = 0u32;
        for (shift, &byte) in tail.iter().enumerate() {
            k1 ^= u32::from(byte) << (8 * shift);
        }
        h1 ^= mix_k1(k1);
    }

    h1 ^= data.len() as u32;
    fmix(h1)
}

/// Maps term sequences to term frequency vectors of fixed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingTf {
    num_features: usize,
    #[serde(default)]
    binary: bool,
}

impl HashingTf {
    /// Create a hasher for a feature space of `num_features` dimensions.
    ///
    /// A power of two spreads terms most evenly.
    pub fn new(num_features: usize) -> Result<Self> {
        if num_features == 0 {
            return Err(HashlearnError::invalid_hyperparameter(
                "number of features must be positive",
            ));
        }
        Ok(HashingTf {
            num_features,
            binary: false,
        })
    }

    /// Record presence (1.0) instead of counts.
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// The feature space dimension.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Whether counts are clipped to 1.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// The feature index of a single term.
    pub fn index_of(&self, term: &str) -> usize {
        let hash = i64::from(murmur3_32(term.as_bytes(), HASH_SEED) as i32);
        let modulus = self.num_features as i64;
        (((hash % modulus) + modulus) % modulus) as usize
    }

    /// Build the term frequency vector of a term sequence.
    pub fn transform<I, S>(&self, terms: I) -> SparseVector
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = SparseVectorBuilder::new(self.num_features);
        for term in terms {
            builder.add(self.index_of(term.as_ref()), 1.0);
        }
        let tf = builder.build();

        if self.binary { tf.map_values(|_| 1.0) } else { tf }
    }

    /// Analyze `text` and hash the resulting terms.
    pub fn transform_text<A: Analyzer + ?Sized>(&self, analyzer: &A, text: &str) -> SparseVector {
        self.transform(analyzer.analyze(text).map(|token| token.text))
    }
}
