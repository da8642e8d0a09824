//! Building and incrementally updating revision trees.

use std::collections::BTreeMap;

use strata_store::ObjectDatabase;
use strata_types::tree::MAX_BUCKETS;
use strata_types::{Bucket, Envelope, Node, ObjectId, RevObject, RevTree};
use tracing::debug;

use crate::error::TreeResult;
use crate::iterator::DepthFirst;
use crate::shard::{bucket_index, LEAF_LIMIT, MAX_SHARD_DEPTH};

/// Builds an immutable [`RevTree`] from named entries.
///
/// Entries are staged by name, so insertion order never influences the
/// result: the finished shape — leaf below [`LEAF_LIMIT`] entries, hashed
/// buckets above it, recursively — is a pure function of the final entry
/// set, and so is the resulting [`ObjectId`].
///
/// A builder is a single-writer value; it owns its staged entries until
/// [`build`] hashes the finished tree and hands its shards to the store.
/// Independent builders over the same store may run in parallel.
///
/// [`build`]: RevTreeBuilder::build
pub struct RevTreeBuilder<'a, S: ObjectDatabase + ?Sized> {
    store: &'a S,
    entries: BTreeMap<String, Node>,
}

impl<'a, S: ObjectDatabase + ?Sized> RevTreeBuilder<'a, S> {
    /// Start an empty builder.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            entries: BTreeMap::new(),
        }
    }

    /// Seed a builder with every entry of an existing tree, for incremental
    /// update. Shard subtrees are read back through the store.
    pub fn from_tree(store: &'a S, tree: &RevTree) -> TreeResult<Self> {
        let mut entries = BTreeMap::new();
        for node in DepthFirst::new(store, tree) {
            let node = node?;
            entries.insert(node.name.clone(), node);
        }
        Ok(Self { store, entries })
    }

    /// Stage an entry, replacing any previous entry with the same name.
    /// Returns the replaced entry, if any.
    pub fn put(&mut self, node: Node) -> Option<Node> {
        self.entries.insert(node.name.clone(), node)
    }

    /// Unstage an entry by name. Returns the removed entry, if any.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.entries.remove(name)
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finalize: shard, persist every produced tree to the store, and
    /// return the root tree with its id.
    pub fn build(self) -> TreeResult<(ObjectId, RevTree)> {
        let Self { store, entries } = self;
        let count = entries.len();
        let (id, tree) = build_level(store, 0, entries)?;
        debug!(id = %id.short_hex(), entries = count, size = tree.size(),
               leaf = tree.is_leaf(), "built tree");
        Ok((id, tree))
    }
}

fn build_level<S: ObjectDatabase + ?Sized>(
    store: &S,
    depth: usize,
    entries: BTreeMap<String, Node>,
) -> TreeResult<(ObjectId, RevTree)> {
    if entries.len() <= LEAF_LIMIT || depth >= MAX_SHARD_DEPTH {
        let tree = RevTree::leaf(entries.into_values().collect())?;
        let id = store.put_object(&RevObject::Tree(tree.clone()))?;
        return Ok((id, tree));
    }

    // Re-distribute the whole entry set by name hash at this depth; every
    // partition becomes a child tree subject to the same shaping rule.
    let mut partitions: Vec<BTreeMap<String, Node>> =
        (0..MAX_BUCKETS).map(|_| BTreeMap::new()).collect();
    for (name, node) in entries {
        let index = bucket_index(&name, depth) as usize;
        partitions[index].insert(name, node);
    }

    let mut size: u64 = 0;
    let mut num_trees: u32 = 0;
    let mut buckets = Vec::new();
    for (index, partition) in partitions.into_iter().enumerate() {
        if partition.is_empty() {
            continue;
        }
        let envelope: Option<Envelope> = partition
            .values()
            .filter_map(|n| n.envelope)
            .reduce(|a, b| a.union(&b));
        let (child_id, child) = build_level(store, depth + 1, partition)?;
        size += child.size();
        num_trees += child.num_trees();
        let mut bucket = Bucket::new(index as u8, child_id);
        if let Some(env) = envelope {
            bucket = bucket.with_envelope(env);
        }
        buckets.push(bucket);
    }

    let tree = RevTree::buckets(size, num_trees, buckets)?;
    let id = store.put_object(&RevObject::Tree(tree.clone()))?;
    Ok((id, tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_codec::empty_tree_id;
    use strata_store::InMemoryObjectDatabase;

    fn feature(i: u32) -> Node {
        Node::feature(
            format!("feature-{i:05}"),
            ObjectId::hash_of(&i.to_be_bytes()),
        )
    }

    // -----------------------------------------------------------------------
    // Shaping
    // -----------------------------------------------------------------------

    #[test]
    fn zero_entries_build_the_well_known_empty_tree() {
        let db = InMemoryObjectDatabase::new();
        let (id, tree) = RevTreeBuilder::new(&db).build().unwrap();
        assert!(tree.is_empty());
        assert_eq!(id, empty_tree_id());

        // And again, independently: the id is stable across runs.
        let (id2, _) = RevTreeBuilder::new(&db).build().unwrap();
        assert_eq!(id, id2);
    }

    #[test]
    fn small_sets_stay_leaf_shaped() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..LEAF_LIMIT as u32 {
            b.put(feature(i));
        }
        let (_, tree) = b.build().unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.size(), LEAF_LIMIT as u64);
        assert_eq!(tree.nodes().len(), LEAF_LIMIT);
    }

    #[test]
    fn exceeding_the_limit_shards_into_buckets() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..(LEAF_LIMIT as u32 + 1) {
            b.put(feature(i));
        }
        let (_, tree) = b.build().unwrap();
        assert!(!tree.is_leaf());
        assert!(tree.nodes().is_empty());
        assert!(!tree.bucket_entries().is_empty());
        // Cumulative accounting survives the sharding.
        assert_eq!(tree.size(), LEAF_LIMIT as u64 + 1);
        assert_eq!(tree.num_trees(), 0);
    }

    #[test]
    fn tree_nodes_count_toward_num_trees_not_size() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..600u32 {
            b.put(feature(i));
        }
        for i in 0..5u32 {
            b.put(Node::tree(
                format!("layer-{i}"),
                ObjectId::hash_of(&[0xAA, i as u8]),
            ));
        }
        let (_, tree) = b.build().unwrap();
        assert_eq!(tree.size(), 600);
        assert_eq!(tree.num_trees(), 5);
    }

    #[test]
    fn put_replaces_and_remove_unstages() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        assert!(b.put(feature(1)).is_none());
        let replaced = b.put(Node::feature("feature-00001", ObjectId::hash_of(b"new")));
        assert!(replaced.is_some());
        assert_eq!(b.len(), 1);
        assert!(b.remove("feature-00001").is_some());
        assert!(b.is_empty());
        assert!(b.remove("feature-00001").is_none());
    }

    #[test]
    fn bucket_envelopes_cover_their_entries() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..700u32 {
            let x = f64::from(i);
            b.put(
                feature(i).with_envelope(Envelope::rect(x, 0.0, x + 1.0, 1.0)),
            );
        }
        let (_, tree) = b.build().unwrap();
        for bucket in tree.bucket_entries() {
            assert!(bucket.envelope.is_some(), "bucket {} lost its extent", bucket.index);
        }
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn insertion_order_does_not_change_the_id() {
        let db = InMemoryObjectDatabase::new();

        let mut forward = RevTreeBuilder::new(&db);
        for i in 0..1500u32 {
            forward.put(feature(i));
        }
        let (id_forward, _) = forward.build().unwrap();

        let mut backward = RevTreeBuilder::new(&db);
        for i in (0..1500u32).rev() {
            backward.put(feature(i));
        }
        let (id_backward, _) = backward.build().unwrap();

        assert_eq!(id_forward, id_backward);
    }

    #[test]
    fn incremental_update_converges_with_fresh_build() {
        let db = InMemoryObjectDatabase::new();

        // Build 600 entries at once.
        let mut fresh = RevTreeBuilder::new(&db);
        for i in 0..600u32 {
            fresh.put(feature(i));
        }
        let (fresh_id, _) = fresh.build().unwrap();

        // Build 400, then reopen and add the remaining 200.
        let mut first = RevTreeBuilder::new(&db);
        for i in 0..400u32 {
            first.put(feature(i));
        }
        let (_, partial) = first.build().unwrap();

        let mut second = RevTreeBuilder::from_tree(&db, &partial).unwrap();
        for i in 400..600u32 {
            second.put(feature(i));
        }
        let (updated_id, _) = second.build().unwrap();

        assert_eq!(fresh_id, updated_id);
    }

    #[test]
    fn removing_an_entry_restores_the_previous_id() {
        let db = InMemoryObjectDatabase::new();

        let mut base = RevTreeBuilder::new(&db);
        for i in 0..700u32 {
            base.put(feature(i));
        }
        let (base_id, base_tree) = base.build().unwrap();

        let mut grown = RevTreeBuilder::from_tree(&db, &base_tree).unwrap();
        grown.put(feature(9999));
        let (grown_id, grown_tree) = grown.build().unwrap();
        assert_ne!(base_id, grown_id);

        let mut shrunk = RevTreeBuilder::from_tree(&db, &grown_tree).unwrap();
        shrunk.remove("feature-09999");
        let (shrunk_id, _) = shrunk.build().unwrap();
        assert_eq!(base_id, shrunk_id);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn split_builds_converge(split in 1usize..63) {
            let db = InMemoryObjectDatabase::new();
            let names: Vec<u32> = (0..64).collect();

            let mut whole = RevTreeBuilder::new(&db);
            for i in &names {
                whole.put(feature(*i));
            }
            let (whole_id, _) = whole.build().unwrap();

            let mut first = RevTreeBuilder::new(&db);
            for i in &names[..split] {
                first.put(feature(*i));
            }
            let (_, partial) = first.build().unwrap();
            let mut rest = RevTreeBuilder::from_tree(&db, &partial).unwrap();
            for i in &names[split..] {
                rest.put(feature(*i));
            }
            let (split_id, _) = rest.build().unwrap();

            prop_assert_eq!(whole_id, split_id);
        }
    }
}
