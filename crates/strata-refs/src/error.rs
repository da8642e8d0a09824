/// Errors from reference operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RefError {
    /// The named ref does not exist.
    #[error("ref not found: {0}")]
    NotFound(String),

    /// Tags are immutable; writing over an existing tag is refused.
    #[error("tag already exists: {0}")]
    TagExists(String),

    /// The ref name is empty or contains forbidden characters.
    #[error("invalid ref name: {0:?}")]
    InvalidName(String),

    /// HEAD points at a branch that does not exist.
    #[error("HEAD points at unknown branch: {0}")]
    DanglingHead(String),
}

/// Result alias for reference operations.
pub type RefResult<T> = Result<T, RefError>;
