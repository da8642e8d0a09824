use strata_types::ObjectId;

/// Errors from encoding and decoding revision objects.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before a complete object could be read.
    #[error("truncated input: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// The input is structurally invalid (bad tag, unordered entries,
    /// out-of-range reference, trailing bytes).
    #[error("malformed object: {0}")]
    Malformed(String),

    /// The format version byte is not one this decoder understands.
    /// Unknown versions are rejected explicitly, never guessed at.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// The decoded object re-encodes to bytes whose hash differs from the
    /// id it was read under: the stored bytes are corrupt.
    #[error("integrity mismatch: expected {expected}, content hashes to {actual}")]
    IntegrityMismatch {
        expected: ObjectId,
        actual: ObjectId,
    },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
