//! Recursive tree comparison with Merkle short-circuiting.
//!
//! Wherever two trees carry the same [`ObjectId`] — at the root, at a
//! bucket, or at an individual node — their contents are equal by
//! construction, and the comparison skips the entire subtree without a
//! single store read. That is what keeps diffs over million-feature
//! collections proportional to the change, not the collection.

use std::collections::BTreeMap;

use strata_store::ObjectDatabase;
use strata_types::tree::MAX_BUCKETS;
use strata_types::{Node, ObjectId, RevTree};

use crate::error::TreeResult;
use crate::iterator::DepthFirst;

/// A single difference between two trees.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeDelta {
    /// The entry exists only on the right side.
    Added(Node),
    /// The entry exists only on the left side.
    Removed(Node),
    /// The entry exists on both sides with different contents.
    Changed { old: Node, new: Node },
}

impl TreeDelta {
    /// The entry name this delta concerns.
    pub fn name(&self) -> &str {
        match self {
            Self::Added(n) | Self::Removed(n) => &n.name,
            Self::Changed { new, .. } => &new.name,
        }
    }
}

/// Compare two trees by id, reading only the shards that differ.
pub fn diff_trees<S: ObjectDatabase + ?Sized>(
    store: &S,
    left: &ObjectId,
    right: &ObjectId,
) -> TreeResult<Vec<TreeDelta>> {
    if left == right {
        return Ok(Vec::new());
    }
    let left_tree = store.get_tree(left)?;
    let right_tree = store.get_tree(right)?;
    let mut deltas = Vec::new();
    diff_level(store, &left_tree, &right_tree, &mut deltas)?;
    Ok(deltas)
}

fn diff_level<S: ObjectDatabase + ?Sized>(
    store: &S,
    left: &RevTree,
    right: &RevTree,
    out: &mut Vec<TreeDelta>,
) -> TreeResult<()> {
    match (left.is_leaf(), right.is_leaf()) {
        (true, true) => {
            diff_leaves(left.nodes(), right.nodes(), out);
            Ok(())
        }
        (false, false) => diff_buckets(store, left, right, out),
        // Mixed shapes happen around the shaping threshold; flatten both
        // sides and compare by name.
        _ => {
            let left_map = collect(store, left)?;
            let right_map = collect(store, right)?;
            diff_maps(left_map, right_map, out);
            Ok(())
        }
    }
}

fn diff_buckets<S: ObjectDatabase + ?Sized>(
    store: &S,
    left: &RevTree,
    right: &RevTree,
    out: &mut Vec<TreeDelta>,
) -> TreeResult<()> {
    for index in 0..MAX_BUCKETS {
        match (left.bucket(index), right.bucket(index)) {
            (None, None) => {}
            // Equal shard ids: identical contents, skip without reading.
            (Some(l), Some(r)) if l.object_id == r.object_id => {}
            (Some(l), Some(r)) => {
                let left_child = store.get_tree(&l.object_id)?;
                let right_child = store.get_tree(&r.object_id)?;
                diff_level(store, &left_child, &right_child, out)?;
            }
            (Some(l), None) => {
                let child = store.get_tree(&l.object_id)?;
                for node in DepthFirst::new(store, &child) {
                    out.push(TreeDelta::Removed(node?));
                }
            }
            (None, Some(r)) => {
                let child = store.get_tree(&r.object_id)?;
                for node in DepthFirst::new(store, &child) {
                    out.push(TreeDelta::Added(node?));
                }
            }
        }
    }
    Ok(())
}

/// Merge-join over two name-ordered node slices.
fn diff_leaves(left: &[Node], right: &[Node], out: &mut Vec<TreeDelta>) {
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let (l, r) = (&left[i], &right[j]);
        match l.name.cmp(&r.name) {
            std::cmp::Ordering::Less => {
                out.push(TreeDelta::Removed(l.clone()));
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(TreeDelta::Added(r.clone()));
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                if l != r {
                    out.push(TreeDelta::Changed {
                        old: l.clone(),
                        new: r.clone(),
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }
    for l in &left[i..] {
        out.push(TreeDelta::Removed(l.clone()));
    }
    for r in &right[j..] {
        out.push(TreeDelta::Added(r.clone()));
    }
}

fn diff_maps(left: BTreeMap<String, Node>, right: BTreeMap<String, Node>, out: &mut Vec<TreeDelta>) {
    for (name, l) in &left {
        match right.get(name) {
            None => out.push(TreeDelta::Removed(l.clone())),
            Some(r) if l != r => out.push(TreeDelta::Changed {
                old: l.clone(),
                new: r.clone(),
            }),
            Some(_) => {}
        }
    }
    for (name, r) in right {
        if !left.contains_key(&name) {
            out.push(TreeDelta::Added(r));
        }
    }
}

fn collect<S: ObjectDatabase + ?Sized>(
    store: &S,
    tree: &RevTree,
) -> TreeResult<BTreeMap<String, Node>> {
    let mut map = BTreeMap::new();
    for node in DepthFirst::new(store, tree) {
        let node = node?;
        map.insert(node.name.clone(), node);
    }
    Ok(map)
}
