//! Commit-graph history traversal for Strata.
//!
//! A [`RevWalk`] turns one or more starting commits into an ordered,
//! deduplicated, lazy sequence of history — the engine behind a
//! source-control log. Parent links are plain commit metadata, independent
//! of the trees they snapshot, so walking history never touches feature
//! data.
//!
//! The walk parameters travel as one immutable [`LogQuery`] value,
//! constructed up front and handed whole to [`RevWalk::new`]; the walker
//! itself is a single-consumer cursor whose only suspension points are
//! store reads. Independent walkers over one store run in parallel freely.

pub mod error;
pub mod query;
pub mod walk;

pub use error::{WalkError, WalkResult};
pub use query::LogQuery;
pub use walk::{LogEntry, RevWalk};
