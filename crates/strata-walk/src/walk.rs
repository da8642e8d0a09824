//! The history cursor.

use std::collections::{BinaryHeap, HashMap, HashSet};

use strata_store::{ObjectDatabase, StoreError};
use strata_types::{ObjectId, RevCommit};
use tracing::debug;

use crate::error::{WalkError, WalkResult};
use crate::query::LogQuery;

/// A commit paired with its id, as yielded by [`RevWalk`].
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub id: ObjectId,
    pub commit: RevCommit,
}

/// Lazy, finite, non-restartable cursor over commit history.
///
/// Each reachable commit is emitted exactly once, even when reachable from
/// several starting points. In the default time order, the frontier of
/// loaded-but-unemitted commits never exceeds the graph's width; each
/// emission costs at most one store read per newly reachable parent.
///
/// Topological order must know every in-walk child of a commit before that
/// commit may be released, so the reachable id-closure is resolved when the
/// walker is constructed; emission itself stays pull-based.
///
/// A walker is a single-consumer value. Cancellation is cooperative: stop
/// pulling and drop it.
pub struct RevWalk<'a, S: ObjectDatabase + ?Sized> {
    store: &'a S,
    since: Option<ObjectId>,
    skip: usize,
    remaining: Option<usize>,
    done: bool,
    mode: Mode,
}

enum Mode {
    Time {
        frontier: BinaryHeap<TimeEntry>,
        seen: HashSet<ObjectId>,
    },
    Topo(TopoState),
}

/// Frontier entry ordered by (timestamp, id): the max-heap pops strictly
/// descending commit time, ties broken by descending id byte order so the
/// sequence is reproducible.
struct TimeEntry {
    timestamp: i64,
    id: ObjectId,
    commit: RevCommit,
}

impl PartialEq for TimeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.id == other.id
    }
}

impl Eq for TimeEntry {}

impl PartialOrd for TimeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

struct TopoState {
    /// Loaded commits awaiting emission.
    commits: HashMap<ObjectId, RevCommit>,
    /// How many in-walk children of each commit are still unemitted; a
    /// commit is released only when this reaches zero, so a shared
    /// ancestor waits for every branch that references it.
    pending_children: HashMap<ObjectId, usize>,
    /// Emission stack. Depth-first along first parents keeps each branch's
    /// exclusive ancestry contiguous.
    ready: Vec<ObjectId>,
}

impl<'a, S: ObjectDatabase + ?Sized> RevWalk<'a, S> {
    /// Prepare a walk for the given query.
    ///
    /// Fails immediately if the effective starting set is empty, or if a
    /// starting commit (including `until`) is absent or not a commit.
    pub fn new(store: &'a S, query: LogQuery) -> WalkResult<Self> {
        let LogQuery {
            starts,
            topological,
            limit,
            skip,
            since,
            until,
        } = query;

        // `until` bounds the top of the range: history is walked from it.
        let starts = match until {
            Some(u) => vec![u],
            None => starts,
        };
        if starts.is_empty() {
            return Err(WalkError::EmptyStartSet);
        }
        let mut unique = Vec::new();
        let mut dedup = HashSet::new();
        for id in starts {
            if dedup.insert(id) {
                unique.push(id);
            }
        }

        let mode = if topological {
            Mode::Topo(TopoState::resolve(store, &unique, since)?)
        } else {
            let mut frontier = BinaryHeap::new();
            let mut seen = HashSet::new();
            for id in &unique {
                if Some(*id) == since {
                    continue;
                }
                seen.insert(*id);
                let commit = load_start(store, id)?;
                frontier.push(TimeEntry {
                    timestamp: commit.timestamp_ms(),
                    id: *id,
                    commit,
                });
            }
            Mode::Time { frontier, seen }
        };

        debug!(starts = unique.len(), topological, "prepared history walk");
        Ok(Self {
            store,
            since,
            skip: skip.unwrap_or(0),
            remaining: limit,
            done: false,
            mode,
        })
    }

    fn next_unfiltered(&mut self) -> Option<WalkResult<LogEntry>> {
        match &mut self.mode {
            Mode::Time { frontier, seen } => {
                let entry = frontier.pop()?;
                for parent in &entry.commit.parent_ids {
                    if Some(*parent) == self.since || !seen.insert(*parent) {
                        continue;
                    }
                    match self.store.get_commit(parent) {
                        Ok(commit) => frontier.push(TimeEntry {
                            timestamp: commit.timestamp_ms(),
                            id: *parent,
                            commit,
                        }),
                        Err(e) => return Some(Err(e.into())),
                    }
                }
                Some(Ok(LogEntry {
                    id: entry.id,
                    commit: entry.commit,
                }))
            }
            Mode::Topo(state) => {
                let id = state.ready.pop()?;
                let commit = state.commits.remove(&id)?;
                // Reverse so the first parent lands on top of the stack and
                // its line is drained before any sibling's.
                for parent in commit.parent_ids.iter().rev() {
                    if let Some(count) = state.pending_children.get_mut(parent) {
                        *count -= 1;
                        if *count == 0 {
                            state.ready.push(*parent);
                        }
                    }
                }
                Some(Ok(LogEntry { id, commit }))
            }
        }
    }
}

impl TopoState {
    /// Resolve the reachable closure from the starts, counting each
    /// commit's in-walk children, then seed the emission stack with the
    /// starts nothing else reaches (in query order, first start on top).
    fn resolve<S: ObjectDatabase + ?Sized>(
        store: &S,
        starts: &[ObjectId],
        since: Option<ObjectId>,
    ) -> WalkResult<Self> {
        let mut commits: HashMap<ObjectId, RevCommit> = HashMap::new();
        let mut pending_children: HashMap<ObjectId, usize> = HashMap::new();
        let mut queue: Vec<ObjectId> = Vec::new();

        for id in starts {
            if Some(*id) == since || commits.contains_key(id) {
                continue;
            }
            let commit = load_start(store, id)?;
            commits.insert(*id, commit);
            queue.push(*id);
        }

        while let Some(id) = queue.pop() {
            let parents = commits[&id].parent_ids.clone();
            for parent in parents {
                if Some(parent) == since {
                    continue;
                }
                *pending_children.entry(parent).or_insert(0) += 1;
                if !commits.contains_key(&parent) {
                    let commit = store.get_commit(&parent)?;
                    commits.insert(parent, commit);
                    queue.push(parent);
                }
            }
        }

        let ready: Vec<ObjectId> = starts
            .iter()
            .rev()
            .filter(|id| Some(**id) != since)
            .filter(|id| pending_children.get(*id).copied().unwrap_or(0) == 0)
            .copied()
            .collect();

        Ok(Self {
            commits,
            pending_children,
            ready,
        })
    }
}

fn load_start<S: ObjectDatabase + ?Sized>(store: &S, id: &ObjectId) -> WalkResult<RevCommit> {
    match store.get_commit(id) {
        Ok(commit) => Ok(commit),
        Err(StoreError::NotFound(_)) => Err(WalkError::StartNotFound(*id)),
        Err(StoreError::WrongKind { .. }) => Err(WalkError::NotACommit(*id)),
        Err(e) => Err(e.into()),
    }
}

impl<S: ObjectDatabase + ?Sized> Iterator for RevWalk<'_, S> {
    type Item = WalkResult<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.remaining == Some(0) {
                self.done = true;
                return None;
            }
            match self.next_unfiltered() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(entry)) => {
                    if self.skip > 0 {
                        self.skip -= 1;
                        continue;
                    }
                    if let Some(remaining) = &mut self.remaining {
                        *remaining -= 1;
                    }
                    return Some(Ok(entry));
                }
            }
        }
    }
}
