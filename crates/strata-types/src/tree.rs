use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object_id::ObjectId;

/// Number of buckets a tree fans out into when it exceeds the leaf limit.
///
/// Part of wire-format v1: decoders must reproduce the encoder's shaping
/// exactly, so this is a constant, not per-tree configuration.
pub const MAX_BUCKETS: u8 = 32;

/// What a tree node points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A [`crate::RevFeature`].
    Feature,
    /// A nested [`RevTree`] (the root of another dataset).
    Tree,
    /// A [`crate::RevFeatureType`] schema record.
    FeatureType,
}

/// Bounding box attached to nodes and buckets for spatial indexing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    /// 2D bounds: (min_x, min_y) .. (max_x, max_y).
    Rect {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    /// 3D bounds with a z range.
    Cube {
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    },
}

impl Envelope {
    /// 2D bounding box.
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest envelope containing both `self` and `other`.
    ///
    /// Mixing a 2D and a 3D envelope widens the result to 3D, taking the z
    /// range from the 3D side.
    pub fn union(&self, other: &Self) -> Self {
        let (ax0, ay0, ax1, ay1, az) = self.components();
        let (bx0, by0, bx1, by1, bz) = other.components();
        let min_x = ax0.min(bx0);
        let min_y = ay0.min(by0);
        let max_x = ax1.max(bx1);
        let max_y = ay1.max(by1);
        let z = match (az, bz) {
            (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
            (Some(z), None) | (None, Some(z)) => Some(z),
            (None, None) => None,
        };
        match z {
            None => Self::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            },
            Some((min_z, max_z)) => Self::Cube {
                min_x,
                min_y,
                min_z,
                max_x,
                max_y,
                max_z,
            },
        }
    }

    fn components(&self) -> (f64, f64, f64, f64, Option<(f64, f64)>) {
        match *self {
            Self::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            } => (min_x, min_y, max_x, max_y, None),
            Self::Cube {
                min_x,
                min_y,
                min_z,
                max_x,
                max_y,
                max_z,
            } => (min_x, min_y, max_x, max_y, Some((min_z, max_z))),
        }
    }
}

/// A named entry inside a tree.
///
/// Points at a feature, a schema record, or the root of a nested tree.
/// Names are unique among siblings. The optional metadata id references a
/// schema record shared by many siblings; the codec stores repeated values
/// once per tree rather than once per node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub object_id: ObjectId,
    pub metadata_id: Option<ObjectId>,
    /// Opaque application payload carried alongside the node.
    pub extra_data: Option<Vec<u8>>,
    pub envelope: Option<Envelope>,
}

impl Node {
    /// A node pointing at a feature.
    pub fn feature(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(name, NodeKind::Feature, object_id)
    }

    /// A node pointing at a nested tree.
    pub fn tree(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(name, NodeKind::Tree, object_id)
    }

    /// A node pointing at a feature-type record.
    pub fn feature_type(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(name, NodeKind::FeatureType, object_id)
    }

    fn new(name: impl Into<String>, kind: NodeKind, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind,
            object_id,
            metadata_id: None,
            extra_data: None,
            envelope: None,
        }
    }

    pub fn with_metadata(mut self, metadata_id: ObjectId) -> Self {
        self.metadata_id = Some(metadata_id);
        self
    }

    pub fn with_extra_data(mut self, extra_data: Vec<u8>) -> Self {
        self.extra_data = Some(extra_data);
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

/// A shard of a bucket-shaped tree: points at the child tree holding every
/// node whose name hashes to this index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Index in `0..MAX_BUCKETS`.
    pub index: u8,
    /// The child [`RevTree`].
    pub object_id: ObjectId,
    /// Spatial extent of everything beneath the child, if known.
    pub envelope: Option<Envelope>,
}

impl Bucket {
    pub fn new(index: u8, object_id: ObjectId) -> Self {
        Self {
            index,
            object_id,
            envelope: None,
        }
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

/// One versioned snapshot of a feature collection.
///
/// A tree is either **leaf-shaped** (nodes embedded directly, ordered by
/// name) or **bucket-shaped** (a sparse map from bucket index to child
/// trees), never both. The constructors enforce the shape invariants, so a
/// `RevTree` value is always well-formed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevTree {
    size: u64,
    num_trees: u32,
    nodes: Vec<Node>,
    buckets: Vec<Bucket>,
}

impl RevTree {
    /// The empty tree: leaf-shaped, no nodes.
    pub fn empty() -> Self {
        Self {
            size: 0,
            num_trees: 0,
            nodes: Vec::new(),
            buckets: Vec::new(),
        }
    }

    /// Build a leaf-shaped tree from nodes.
    ///
    /// Nodes are sorted by name; duplicate sibling names are rejected.
    /// `size` and `num_trees` are derived from the node kinds.
    pub fn leaf(mut nodes: Vec<Node>) -> Result<Self, TypeError> {
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in nodes.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(TypeError::DuplicateName(pair[0].name.clone()));
            }
        }
        let size = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Feature)
            .count() as u64;
        let num_trees = nodes.iter().filter(|n| n.kind == NodeKind::Tree).count() as u32;
        Ok(Self {
            size,
            num_trees,
            nodes,
            buckets: Vec::new(),
        })
    }

    /// Build a bucket-shaped tree.
    ///
    /// `size` and `num_trees` are the cumulative counts declared by the
    /// builder (sums over the children). Buckets are sorted by index;
    /// duplicate or out-of-range indices are rejected, as is an empty
    /// bucket set (an empty tree is leaf-shaped).
    pub fn buckets(size: u64, num_trees: u32, mut buckets: Vec<Bucket>) -> Result<Self, TypeError> {
        if buckets.is_empty() {
            return Err(TypeError::EmptyBuckets);
        }
        buckets.sort_by_key(|b| b.index);
        for b in &buckets {
            if b.index >= MAX_BUCKETS {
                return Err(TypeError::BucketIndexOutOfRange(b.index));
            }
        }
        for pair in buckets.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(TypeError::DuplicateBucket(pair[0].index));
            }
        }
        Ok(Self {
            size,
            num_trees,
            nodes: Vec::new(),
            buckets,
        })
    }

    /// Cumulative count of feature nodes reachable through bucket sharding.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cumulative count of tree nodes reachable through bucket sharding.
    pub fn num_trees(&self) -> u32 {
        self.num_trees
    }

    /// Returns `true` if this tree embeds its nodes directly.
    pub fn is_leaf(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns `true` if this is the empty tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.buckets.is_empty()
    }

    /// Direct nodes, ordered by name. Empty for bucket-shaped trees.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Buckets, ordered by index. Empty for leaf-shaped trees.
    pub fn bucket_entries(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The bucket at `index`, if present.
    pub fn bucket(&self, index: u8) -> Option<&Bucket> {
        self.buckets
            .binary_search_by_key(&index, |b| b.index)
            .ok()
            .map(|i| &self.buckets[i])
    }

    /// Look up a direct node by name (leaf shape only).
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|n| n.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.nodes[i])
    }
}
