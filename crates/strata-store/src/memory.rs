use std::collections::HashMap;
use std::sync::RwLock;

use strata_types::ObjectId;
use tracing::trace;

use crate::error::StoreResult;
use crate::traits::ObjectDatabase;

/// In-memory, HashMap-based object database.
///
/// Intended for tests and embedding. All objects are held behind a `RwLock`
/// for safe concurrent access; bytes are cloned on read.
pub struct InMemoryObjectDatabase {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectDatabase {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|bytes| bytes.len() as u64)
            .sum()
    }
}

impl Default for InMemoryObjectDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectDatabase for InMemoryObjectDatabase {
    fn put(&self, bytes: &[u8]) -> StoreResult<ObjectId> {
        let id = ObjectId::hash_of(bytes);
        let mut map = self.objects.write().expect("lock poisoned");
        // Idempotent: content-addressing guarantees an existing entry under
        // this id already holds these exact bytes.
        if !map.contains_key(&id) {
            trace!(id = %id.short_hex(), len = bytes.len(), "stored object");
            map.insert(id, bytes.to_vec());
        }
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id)
            .cloned()
            .ok_or(crate::error::StoreError::NotFound(*id))
    }

    fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectDatabase")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use strata_codec::hash_object;
    use strata_types::{Node, ObjectKind, RevFeature, RevObject, RevTree};

    fn store() -> InMemoryObjectDatabase {
        InMemoryObjectDatabase::new()
    }

    // -----------------------------------------------------------------------
    // Raw byte contract
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get_roundtrip() {
        let db = store();
        let id = db.put(b"hello world").unwrap();
        assert_eq!(db.get(&id).unwrap(), b"hello world");
    }

    #[test]
    fn put_is_idempotent() {
        let db = store();
        let id1 = db.put(b"same bytes").unwrap();
        let id2 = db.put(b"same bytes").unwrap();
        assert_eq!(id1, id2);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn different_bytes_different_ids() {
        let db = store();
        let id1 = db.put(b"aaa").unwrap();
        let id2 = db.put(b"bbb").unwrap();
        assert_ne!(id1, id2);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn get_missing_fails_not_found() {
        let db = store();
        let id = ObjectId::hash_of(b"never written");
        let err = db.get(&id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[test]
    fn has_reflects_presence() {
        let db = store();
        let id = db.put(b"present").unwrap();
        assert!(db.has(&id).unwrap());
        assert!(!db.has(&ObjectId::hash_of(b"absent")).unwrap());
    }

    #[test]
    fn len_is_empty_total_bytes() {
        let db = store();
        assert!(db.is_empty());
        db.put(b"12345").unwrap();
        db.put(b"123456789").unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.total_bytes(), 14);
        assert!(!db.is_empty());
    }

    // -----------------------------------------------------------------------
    // Typed access
    // -----------------------------------------------------------------------

    #[test]
    fn put_object_then_get_object() {
        let db = store();
        let obj = RevObject::Feature(RevFeature::new(b"point".to_vec()));
        let id = db.put_object(&obj).unwrap();
        assert_eq!(id, hash_object(&obj));
        assert_eq!(db.get_object(&id).unwrap(), obj);
    }

    #[test]
    fn get_tree_resolves_empty_tree_without_writes() {
        let db = store();
        let tree = db.get_tree(&strata_codec::empty_tree_id()).unwrap();
        assert!(tree.is_empty());
        assert!(db.is_empty());
    }

    #[test]
    fn get_tree_rejects_wrong_kind() {
        let db = store();
        let id = db
            .put_object(&RevObject::Feature(RevFeature::new(vec![1])))
            .unwrap();
        let err = db.get_tree(&id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::WrongKind {
                expected: ObjectKind::Tree,
                actual: ObjectKind::Feature,
                ..
            }
        ));
    }

    #[test]
    fn get_commit_rejects_wrong_kind() {
        let db = store();
        let tree = RevTree::leaf(vec![Node::feature("a", ObjectId::hash_of(b"a"))]).unwrap();
        let id = db.put_object(&RevObject::Tree(tree)).unwrap();
        let err = db.get_commit(&id).unwrap_err();
        assert!(matches!(err, StoreError::WrongKind { .. }));
    }

    #[test]
    fn corrupted_bytes_fail_integrity_check() {
        let db = store();
        let obj = RevObject::Feature(RevFeature::new(b"genuine".to_vec()));
        let id = db.put_object(&obj).unwrap();

        // Overwrite the slot behind the id with a different valid object's
        // bytes, simulating on-disk corruption.
        let other = strata_codec::encode(&RevObject::Feature(RevFeature::new(b"fake".to_vec())));
        db.objects
            .write()
            .expect("lock poisoned")
            .insert(id, other);

        let err = db.get_object(&id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Codec(strata_codec::CodecError::IntegrityMismatch { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_readers_and_idempotent_writers() {
        use std::sync::Arc;
        use std::thread;

        let db = Arc::new(store());
        let id = db.put(b"shared data").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        // Racing writers of identical content are harmless.
                        let written = db.put(b"shared data").unwrap();
                        assert_eq!(written, id);
                    } else {
                        assert_eq!(db.get(&id).unwrap(), b"shared data");
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(db.len(), 1);
    }
}
