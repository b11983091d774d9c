//! Text normalization and pairwise similarity scoring.

pub mod normalize;
pub mod similarity;

pub use normalize::TextNormalizer;
pub use similarity::{SimilarityEngine, DEFAULT_NGRAM_SIZE, DEFAULT_THRESHOLD};
