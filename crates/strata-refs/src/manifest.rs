use serde::{Deserialize, Serialize};

use crate::error::RefResult;
use crate::traits::RefStore;
use crate::types::{Head, Ref};

/// A summary of a repository's named state: current HEAD, branch list,
/// tag list — the value history-facing consumers serialize for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub head: Option<Head>,
    /// Branches, sorted by name.
    pub branches: Vec<Ref>,
    /// Tags, sorted by name.
    pub tags: Vec<Ref>,
}

impl Manifest {
    /// Assemble a manifest from a ref store.
    pub fn from_store(refs: &dyn RefStore) -> RefResult<Self> {
        Ok(Self {
            head: refs.head()?,
            branches: refs.branches()?,
            tags: refs.tags()?,
        })
    }
}
