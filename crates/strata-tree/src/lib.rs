//! Revision-tree engine for Strata.
//!
//! A feature collection snapshot is a Merkle tree: small collections are a
//! single leaf of name-ordered nodes; once a level would exceed
//! [`shard::LEAF_LIMIT`] entries it is re-distributed into up to 32 buckets
//! by a hash of each entry's name, recursively, so arbitrarily large
//! collections shard to bounded-size pieces.
//!
//! Because the shape is a pure function of the entry set — never of
//! insertion order or update history — rebuilding an equivalent collection
//! always reproduces the same root [`ObjectId`]. Equal ids therefore mean
//! equal contents, which is what lets [`diff_trees`] skip entire shared
//! subtrees.
//!
//! [`ObjectId`]: strata_types::ObjectId

pub mod builder;
pub mod diff;
pub mod error;
pub mod iterator;
pub mod lookup;
pub mod shard;

pub use builder::RevTreeBuilder;
pub use diff::{diff_trees, TreeDelta};
pub use error::{TreeError, TreeResult};
pub use iterator::DepthFirst;
pub use lookup::find_node;
pub use shard::{bucket_index, name_hash, LEAF_LIMIT, MAX_SHARD_DEPTH};
