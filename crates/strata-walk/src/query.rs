use strata_types::ObjectId;

/// Parameters of one history walk.
///
/// A `LogQuery` is an immutable request value: build it up front, hand it
/// whole to [`RevWalk::new`](crate::RevWalk::new). Nothing here mutates
/// after construction, so queries can be cloned and shared across threads
/// while their walkers run independently.
#[derive(Clone, Debug)]
pub struct LogQuery {
    /// Commits to walk from. Must be non-empty (unless `until` is set).
    pub starts: Vec<ObjectId>,
    /// Topological order instead of descending commit time.
    pub topological: bool,
    /// Emit at most this many commits, counted after ordering and filters.
    pub limit: Option<usize>,
    /// Drop this many commits from the front, after ordering and filters.
    pub skip: Option<usize>,
    /// Exclude this commit and all of its ancestors from the walk.
    pub since: Option<ObjectId>,
    /// Walk from this commit instead of `starts`.
    pub until: Option<ObjectId>,
}

impl LogQuery {
    /// A time-ordered, unbounded walk from the given starting commits.
    pub fn new(starts: Vec<ObjectId>) -> Self {
        Self {
            starts,
            topological: false,
            limit: None,
            skip: None,
            since: None,
            until: None,
        }
    }

    /// A walk from a single starting commit.
    pub fn from_start(start: ObjectId) -> Self {
        Self::new(vec![start])
    }

    /// Request topological order.
    pub fn topological(mut self) -> Self {
        self.topological = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_since(mut self, since: ObjectId) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: ObjectId) -> Self {
        self.until = Some(until);
        self
    }
}
