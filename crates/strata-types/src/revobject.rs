use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object_id::ObjectId;
use crate::tree::RevTree;

/// The kind of a revision object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A point in history: root tree plus parent links.
    Commit,
    /// One snapshot of a feature collection.
    Tree,
    /// A single geospatial feature (opaque attribute payload).
    Feature,
    /// A feature schema record (opaque payload).
    FeatureType,
    /// An annotated tag pointing at a commit.
    Tag,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit => write!(f, "commit"),
            Self::Tree => write!(f, "tree"),
            Self::Feature => write!(f, "feature"),
            Self::FeatureType => write!(f, "featuretype"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Identity plus timestamp of an author or committer.
///
/// Timestamps are milliseconds since the Unix epoch; the timezone offset is
/// carried separately so history displays can reconstruct local time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Offset from UTC in minutes.
    pub tz_offset_mins: i32,
}

impl Signature {
    /// Create a new signature.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp_ms: i64,
        tz_offset_mins: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp_ms,
            tz_offset_mins,
        }
    }
}

/// A commit: one point in the history graph.
///
/// Immutable once created. The commit's own identity is the hash of its
/// canonical encoding; it is not stored inside the object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevCommit {
    /// Root tree of the snapshot this commit records.
    pub tree_id: ObjectId,
    /// Parent commits, ordered. Empty = root commit; two or more = merge.
    pub parent_ids: Vec<ObjectId>,
    /// Who created the content.
    pub author: Signature,
    /// Who recorded the commit.
    pub committer: Signature,
    /// Free-text commit message.
    pub message: String,
}

impl RevCommit {
    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Returns `true` if this commit has two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() >= 2
    }

    /// The commit timestamp used for history ordering (committer time).
    pub fn timestamp_ms(&self) -> i64 {
        self.committer.timestamp_ms
    }
}

/// A single geospatial feature.
///
/// The attribute/geometry encoding is defined outside the storage core; the
/// payload is carried and hashed verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevFeature {
    pub payload: Vec<u8>,
}

impl RevFeature {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

/// A feature schema record, referenced by nodes through their metadata id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevFeatureType {
    pub name: String,
    pub payload: Vec<u8>,
}

impl RevFeatureType {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// An annotated tag: a named, immutable pointer at a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevTag {
    pub name: String,
    /// The commit this tag points at.
    pub target: ObjectId,
    pub tagger: Signature,
    pub message: String,
}

/// A revision object: the tagged union the codec dispatches on.
///
/// Every variant's identity is the [`ObjectId`] of its canonical encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RevObject {
    Commit(RevCommit),
    Tree(RevTree),
    Feature(RevFeature),
    FeatureType(RevFeatureType),
    Tag(RevTag),
}

impl RevObject {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Feature(_) => ObjectKind::Feature,
            Self::FeatureType(_) => ObjectKind::FeatureType,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Borrow the commit, if this is one.
    pub fn as_commit(&self) -> Option<&RevCommit> {
        match self {
            Self::Commit(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow the tree, if this is one.
    pub fn as_tree(&self) -> Option<&RevTree> {
        match self {
            Self::Tree(t) => Some(t),
            _ => None,
        }
    }
}

impl From<RevCommit> for RevObject {
    fn from(c: RevCommit) -> Self {
        Self::Commit(c)
    }
}

impl From<RevTree> for RevObject {
    fn from(t: RevTree) -> Self {
        Self::Tree(t)
    }
}

impl From<RevFeature> for RevObject {
    fn from(f: RevFeature) -> Self {
        Self::Feature(f)
    }
}

impl From<RevFeatureType> for RevObject {
    fn from(ft: RevFeatureType) -> Self {
        Self::FeatureType(ft)
    }
}

impl From<RevTag> for RevObject {
    fn from(t: RevTag) -> Self {
        Self::Tag(t)
    }
}
