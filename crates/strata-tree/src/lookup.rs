//! Name lookup over revision trees.

use strata_store::ObjectDatabase;
use strata_types::{Node, RevTree};

use crate::error::{TreeError, TreeResult};
use crate::shard::{bucket_index, MAX_SHARD_DEPTH};

/// Resolve a name to its node.
///
/// Leaf trees are searched directly (the node list is name-ordered);
/// bucketed trees hash the name to a bucket at the current depth and
/// recurse into that shard. An absent name is `Ok(None)`, not an error.
pub fn find_node<S: ObjectDatabase + ?Sized>(
    store: &S,
    tree: &RevTree,
    name: &str,
) -> TreeResult<Option<Node>> {
    find_at_depth(store, tree, name, 0)
}

fn find_at_depth<S: ObjectDatabase + ?Sized>(
    store: &S,
    tree: &RevTree,
    name: &str,
    depth: usize,
) -> TreeResult<Option<Node>> {
    if tree.is_leaf() {
        return Ok(tree.node(name).cloned());
    }
    if depth >= MAX_SHARD_DEPTH {
        return Err(TreeError::DepthExceeded(MAX_SHARD_DEPTH));
    }
    match tree.bucket(bucket_index(name, depth)) {
        None => Ok(None),
        Some(bucket) => {
            let child = store.get_tree(&bucket.object_id)?;
            find_at_depth(store, &child, name, depth + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::InMemoryObjectDatabase;
    use strata_types::{Node, ObjectId};

    use crate::builder::RevTreeBuilder;

    fn feature(i: u32) -> Node {
        Node::feature(
            format!("feature-{i:05}"),
            ObjectId::hash_of(&i.to_be_bytes()),
        )
    }

    #[test]
    fn find_in_leaf() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..10 {
            b.put(feature(i));
        }
        let (_, tree) = b.build().unwrap();
        assert!(tree.is_leaf());

        let found = find_node(&db, &tree, "feature-00007").unwrap().unwrap();
        assert_eq!(found.object_id, ObjectId::hash_of(&7u32.to_be_bytes()));
        assert!(find_node(&db, &tree, "nope").unwrap().is_none());
    }

    #[test]
    fn find_through_buckets() {
        let db = InMemoryObjectDatabase::new();
        let mut b = RevTreeBuilder::new(&db);
        for i in 0..2000 {
            b.put(feature(i));
        }
        let (_, tree) = b.build().unwrap();
        assert!(!tree.is_leaf());

        // Every entry resolves through the shard structure.
        for i in [0u32, 1, 511, 512, 513, 1024, 1999] {
            let name = format!("feature-{i:05}");
            let found = find_node(&db, &tree, &name).unwrap();
            assert_eq!(
                found.map(|n| n.object_id),
                Some(ObjectId::hash_of(&i.to_be_bytes())),
                "lookup of {name}"
            );
        }
        assert!(find_node(&db, &tree, "feature-99999").unwrap().is_none());
    }

    #[test]
    fn find_in_empty_tree() {
        let db = InMemoryObjectDatabase::new();
        assert!(find_node(&db, &RevTree::empty(), "anything")
            .unwrap()
            .is_none());
    }
}
