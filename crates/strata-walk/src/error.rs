use strata_store::StoreError;
use strata_types::ObjectId;

/// Errors from history walks.
///
/// Running out of history is *not* an error: the walk's iterator simply
/// ends.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// The query named no starting commits.
    #[error("no starting commits given")]
    EmptyStartSet,

    /// A requested starting commit does not exist in the store.
    #[error("starting commit not found: {0}")]
    StartNotFound(ObjectId),

    /// A requested starting id resolves to something other than a commit.
    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    /// Failure reading commit objects mid-walk (a missing or corrupt
    /// parent indicates store damage).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for walk operations.
pub type WalkResult<T> = Result<T, WalkError>;
