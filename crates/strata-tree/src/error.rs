use strata_store::StoreError;
use strata_types::TypeError;

/// Errors from tree construction, lookup, iteration, and diff.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Invalid tree contents (duplicate sibling names, bad bucket layout).
    #[error(transparent)]
    Invalid(#[from] TypeError),

    /// Failure reading or writing the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bucket-shaped tree was found deeper than the format shards;
    /// no valid encoder produces one.
    #[error("bucket-shaped tree deeper than the maximum shard depth {0}")]
    DepthExceeded(usize),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
