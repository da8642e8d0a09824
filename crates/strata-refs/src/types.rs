use serde::{Deserialize, Serialize};
use strata_types::ObjectId;

use crate::error::{RefError, RefResult};

/// A named reference into the commit graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ref {
    /// A branch is a mutable pointer to a commit; it moves forward as new
    /// commits are recorded.
    Branch { name: String, target: ObjectId },

    /// A tag is an immutable pointer to a commit. Once created it cannot
    /// be moved; delete and recreate if needed.
    Tag { name: String, target: ObjectId },
}

impl Ref {
    /// The canonical name of this ref (e.g. `refs/heads/main`).
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Branch { name, .. } => format!("refs/heads/{name}"),
            Self::Tag { name, .. } => format!("refs/tags/{name}"),
        }
    }

    /// The short name, without the `refs/` prefix.
    pub fn short_name(&self) -> &str {
        match self {
            Self::Branch { name, .. } | Self::Tag { name, .. } => name,
        }
    }

    /// The commit this ref points at.
    pub fn target(&self) -> ObjectId {
        match self {
            Self::Branch { target, .. } | Self::Tag { target, .. } => *target,
        }
    }

    /// Returns `true` if this is a branch ref.
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch { .. })
    }

    /// Returns `true` if this is a tag ref.
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag { .. })
    }
}

/// The state of HEAD: either symbolic (pointing at a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// HEAD follows a branch by name.
    Symbolic(String),
    /// HEAD is pinned directly to a commit.
    Detached(ObjectId),
}

/// Validate a short ref name.
///
/// Names may contain slashes (`feature/auth`), but not whitespace, control
/// characters, or the `..` sequence, and may not be empty or start or end
/// with a slash.
pub fn validate_name(name: &str) -> RefResult<()> {
    let bad = name.is_empty()
        || name.starts_with('/')
        || name.ends_with('/')
        || name.contains("..")
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '~' || c == '^' || c == ':');
    if bad {
        return Err(RefError::InvalidName(name.to_string()));
    }
    Ok(())
}
