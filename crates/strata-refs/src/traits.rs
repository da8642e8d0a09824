use strata_types::ObjectId;

use crate::error::RefResult;
use crate::types::{Head, Ref};

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`) with atomic
/// read/write/delete of individual refs. The namespace is hierarchical:
///
/// - `refs/heads/*` for branches
/// - `refs/tags/*` for tags
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name (e.g. `refs/heads/main`).
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> RefResult<Option<Ref>>;

    /// Create or update a ref.
    ///
    /// Branch writes move the branch; tag writes fail with
    /// [`RefError::TagExists`](crate::RefError::TagExists) if the tag
    /// already exists. The short name is validated.
    fn write_ref(&self, reference: &Ref) -> RefResult<()>;

    /// Delete a ref by canonical name. Returns `true` if it existed.
    fn delete_ref(&self, name: &str) -> RefResult<bool>;

    /// List refs whose canonical name starts with `prefix`, sorted by name.
    /// Pass `""` for all refs.
    fn list_refs(&self, prefix: &str) -> RefResult<Vec<Ref>>;

    /// The current HEAD state, if set.
    fn head(&self) -> RefResult<Option<Head>>;

    /// Point HEAD at a branch by short name.
    fn set_head(&self, branch: &str) -> RefResult<()>;

    /// Detach HEAD to a specific commit.
    fn set_head_detached(&self, target: ObjectId) -> RefResult<()>;

    /// All branch refs, sorted by name.
    fn branches(&self) -> RefResult<Vec<Ref>> {
        self.list_refs("refs/heads/")
    }

    /// All tag refs, sorted by name.
    fn tags(&self) -> RefResult<Vec<Ref>> {
        self.list_refs("refs/tags/")
    }

    /// Resolve HEAD to a commit id, following a symbolic HEAD through its
    /// branch.
    fn resolve_head(&self) -> RefResult<Option<ObjectId>> {
        match self.head()? {
            None => Ok(None),
            Some(Head::Detached(id)) => Ok(Some(id)),
            Some(Head::Symbolic(branch)) => {
                let canonical = format!("refs/heads/{branch}");
                match self.read_ref(&canonical)? {
                    Some(r) => Ok(Some(r.target())),
                    None => Err(crate::error::RefError::DanglingHead(branch)),
                }
            }
        }
    }
}
