use strata_codec::CodecError;
use strata_types::{ObjectId, ObjectKind};

/// Errors from object database operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object is absent from the store.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The stored object exists but is not of the requested kind.
    #[error("object {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Decode or integrity failure while reading a typed object.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
