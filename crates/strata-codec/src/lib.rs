//! Canonical binary encoding for Strata revision objects.
//!
//! [`encode`] and [`decode`] are deterministic inverses for every object the
//! system produces: semantically identical objects always yield
//! byte-identical output (ordered nodes and buckets, fixed-width big-endian
//! integers, length-prefixed UTF-8 strings). That canonicality is what makes
//! content addressing work — an object's [`ObjectId`] is the hash of its
//! encoding, computed by [`hash_object`].
//!
//! Repeated metadata ids across sibling nodes are collapsed into a per-tree
//! lookup table during encode, so a collection whose million features share
//! three schema records stores those three ids once, not a million times.
//!
//! [`decode_verified`] additionally re-encodes the decoded object and checks
//! the hash of the re-encoding against an expected id, surfacing store
//! corruption as [`CodecError::IntegrityMismatch`].
//!
//! [`ObjectId`]: strata_types::ObjectId

pub mod decode;
pub mod encode;
pub mod error;
pub mod format;

pub use decode::{decode, decode_verified};
pub use encode::{empty_tree_id, encode, hash_object};
pub use error::{CodecError, CodecResult};
pub use format::FORMAT_VERSION;
