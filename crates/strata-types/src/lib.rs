//! Foundation types for Strata.
//!
//! This crate provides the revision-object model shared by every other
//! Strata crate: content-addressed identifiers, commits, trees, features,
//! and tags. All of these are immutable value types whose identity is the
//! hash of their canonical encoding (computed in `strata-codec`).
//!
//! # Key Types
//!
//! - [`ObjectId`] — 20-byte content-addressed identifier
//! - [`RevObject`] — tagged union over all revision object variants
//! - [`RevTree`] / [`Node`] / [`Bucket`] — one snapshot of a feature
//!   collection, sharded into a Merkle structure once it grows large
//! - [`RevCommit`] / [`Signature`] — a point in history referencing a root
//!   tree and zero or more parent commits
//! - [`Envelope`] — bounding box attached to nodes and buckets for spatial
//!   indexing

pub mod error;
pub mod object_id;
pub mod revobject;
pub mod tree;

pub use error::TypeError;
pub use object_id::ObjectId;
pub use revobject::{
    ObjectKind, RevCommit, RevFeature, RevFeatureType, RevObject, RevTag, Signature,
};
pub use tree::{Bucket, Envelope, Node, NodeKind, RevTree};
