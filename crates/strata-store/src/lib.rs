//! Content-addressed object storage for Strata.
//!
//! Every revision object — commits, trees, features, feature types, tags —
//! is stored as an immutable byte blob identified by the hash of its
//! canonical encoding. The store is the single source of truth for
//! durability; the tree engine and the history walker never share state
//! outside of it.
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writing the same bytes twice never produces two copies or two ids.
//! 3. Concurrent reads are always safe; concurrent writers racing on the
//!    same logical object produce identical bytes, so last-writer-wins is
//!    harmless.
//! 4. The byte-level store never interprets object contents; typed access
//!    goes through the codec with hash verification on read.
//! 5. A missing object is `NotFound` immediately — retrying a read of an
//!    immutable object cannot succeed without external repair.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectDatabase;
pub use traits::ObjectDatabase;
