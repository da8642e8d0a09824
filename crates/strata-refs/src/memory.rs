use std::collections::BTreeMap;
use std::sync::RwLock;

use strata_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, RefResult};
use crate::traits::RefStore;
use crate::types::{validate_name, Head, Ref};

/// In-memory reference store, for tests and embedding.
///
/// Refs live in a `BTreeMap` keyed by canonical name, so prefix listing
/// falls out of the map's ordering.
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, Ref>>,
    head: RwLock<Option<Head>>,
}

impl InMemoryRefStore {
    /// Create an empty ref store with no HEAD.
    pub fn new() -> Self {
        Self {
            refs: RwLock::new(BTreeMap::new()),
            head: RwLock::new(None),
        }
    }

    /// Number of refs currently stored.
    pub fn len(&self) -> usize {
        self.refs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no refs are stored.
    pub fn is_empty(&self) -> bool {
        self.refs.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryRefStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> RefResult<Option<Ref>> {
        Ok(self.refs.read().expect("lock poisoned").get(name).cloned())
    }

    fn write_ref(&self, reference: &Ref) -> RefResult<()> {
        validate_name(reference.short_name())?;
        let canonical = reference.canonical_name();
        let mut refs = self.refs.write().expect("lock poisoned");
        if reference.is_tag() && refs.contains_key(&canonical) {
            return Err(RefError::TagExists(reference.short_name().to_string()));
        }
        debug!(name = %canonical, target = %reference.target().short_hex(), "wrote ref");
        refs.insert(canonical, reference.clone());
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> RefResult<bool> {
        let mut refs = self.refs.write().expect("lock poisoned");
        Ok(refs.remove(name).is_some())
    }

    fn list_refs(&self, prefix: &str) -> RefResult<Vec<Ref>> {
        let refs = self.refs.read().expect("lock poisoned");
        Ok(refs
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn head(&self) -> RefResult<Option<Head>> {
        Ok(self.head.read().expect("lock poisoned").clone())
    }

    fn set_head(&self, branch: &str) -> RefResult<()> {
        validate_name(branch)?;
        *self.head.write().expect("lock poisoned") = Some(Head::Symbolic(branch.to_string()));
        Ok(())
    }

    fn set_head_detached(&self, target: ObjectId) -> RefResult<()> {
        *self.head.write().expect("lock poisoned") = Some(Head::Detached(target));
        Ok(())
    }
}
