use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("duplicate node name in tree: {0:?}")]
    DuplicateName(String),

    #[error("bucket index out of range: {0}")]
    BucketIndexOutOfRange(u8),

    #[error("duplicate bucket index: {0}")]
    DuplicateBucket(u8),

    #[error("bucket-shaped tree must have at least one bucket")]
    EmptyBuckets,
}
