//! Depth-first iteration over every node reachable beneath a tree.

use strata_store::ObjectDatabase;
use strata_types::{Node, ObjectId, RevTree};

use crate::error::TreeResult;

enum Pending {
    Node(Node),
    Tree(ObjectId),
}

/// Lazily yields every node of a tree, descending through bucket shards.
///
/// Nodes of a leaf come out in name order; a bucketed tree yields its
/// shards in index order. Nested trees referenced by tree-kind *nodes* are
/// the roots of other datasets and are not descended into. Child shard
/// trees are read from the store only when the iteration reaches them.
pub struct DepthFirst<'a, S: ObjectDatabase + ?Sized> {
    store: &'a S,
    stack: Vec<Pending>,
}

impl<'a, S: ObjectDatabase + ?Sized> DepthFirst<'a, S> {
    /// Iterate the contents of `tree`.
    pub fn new(store: &'a S, tree: &RevTree) -> Self {
        let mut iter = Self {
            store,
            stack: Vec::new(),
        };
        iter.push_tree(tree);
        iter
    }

    fn push_tree(&mut self, tree: &RevTree) {
        // LIFO stack: push in reverse so entries pop in natural order.
        for bucket in tree.bucket_entries().iter().rev() {
            self.stack.push(Pending::Tree(bucket.object_id));
        }
        for node in tree.nodes().iter().rev() {
            self.stack.push(Pending::Node(node.clone()));
        }
    }
}

impl<S: ObjectDatabase + ?Sized> Iterator for DepthFirst<'_, S> {
    type Item = TreeResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Pending::Node(node) => return Some(Ok(node)),
                Pending::Tree(id) => match self.store.get_tree(&id) {
                    Ok(child) => self.push_tree(&child),
                    Err(e) => return Some(Err(e.into())),
                },
            }
        }
    }
}
