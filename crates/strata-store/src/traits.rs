use strata_codec::{decode_verified, empty_tree_id, encode};
use strata_types::{ObjectId, ObjectKind, RevCommit, RevObject, RevTree};

use crate::error::{StoreError, StoreResult};

/// Content-addressed object database.
///
/// All implementations must satisfy these invariants:
/// - `put` computes the id from the bytes; writing an id that already
///   exists is a no-op, not an error (idempotent).
/// - `get` of an absent id fails with [`StoreError::NotFound`]; it is never
///   retried inside the core.
/// - Objects are immutable once written; concurrent reads and concurrent
///   idempotent writes are safe.
/// - The store never interprets the bytes it holds.
pub trait ObjectDatabase: Send + Sync {
    /// Write raw object bytes, returning their content-addressed id.
    fn put(&self, bytes: &[u8]) -> StoreResult<ObjectId>;

    /// Read raw object bytes by id.
    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists.
    fn has(&self, id: &ObjectId) -> StoreResult<bool>;

    // -- Typed access, layered on the codec ---------------------------------

    /// Encode a revision object and write it.
    fn put_object(&self, obj: &RevObject) -> StoreResult<ObjectId> {
        self.put(&encode(obj))
    }

    /// Read a revision object, verifying on the way out that its content
    /// re-hashes to the requested id.
    fn get_object(&self, id: &ObjectId) -> StoreResult<RevObject> {
        let bytes = self.get(id)?;
        Ok(decode_verified(&bytes, id)?)
    }

    /// Read a tree by id.
    ///
    /// The empty tree has a well-known id and needs no backing bytes, so it
    /// is resolvable from any store, including a brand-new one.
    fn get_tree(&self, id: &ObjectId) -> StoreResult<RevTree> {
        if *id == empty_tree_id() {
            return Ok(RevTree::empty());
        }
        match self.get_object(id)? {
            RevObject::Tree(tree) => Ok(tree),
            other => Err(StoreError::WrongKind {
                id: *id,
                expected: ObjectKind::Tree,
                actual: other.kind(),
            }),
        }
    }

    /// Read a commit by id.
    fn get_commit(&self, id: &ObjectId) -> StoreResult<RevCommit> {
        match self.get_object(id)? {
            RevObject::Commit(commit) => Ok(commit),
            other => Err(StoreError::WrongKind {
                id: *id,
                expected: ObjectKind::Commit,
                actual: other.kind(),
            }),
        }
    }
}
