use std::fmt::Debug;
use std::time::Instant;

mod managed;
pub use managed::Managed;
pub(crate) use managed::Slot;

/// The capability required of any pooled resource type.
///
/// The pool only decides *when* a resource is opened or closed. What opening
/// a connection or a file handle involves is left to the implementation.
pub trait Resource: Send {
    /// The error produced by a failed `open` or `close`
    type Error: Debug;

    /// Establish the underlying resource. Called lazily by the pool the first
    /// time a closed resource is acquired.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Tear down the underlying resource. Called by the pool on release when
    /// the resource is recycled.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// The lifecycle record tracked by the pool for each resource.
///
/// A closed resource carries no timestamps or usage count. An open resource
/// always has an open timestamp and a usage count, and has a last-used
/// timestamp once it has been released at least once since opening.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResourceInfo {
    state: State,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Closed,
    Open {
        opened_at: Instant,
        last_used: Option<Instant>,
        usage_count: usize,
    },
}

impl ResourceInfo {
    pub(crate) const fn closed() -> Self {
        Self {
            state: State::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// The time at which the resource was last opened.
    pub fn last_opened(&self) -> Option<Instant> {
        match self.state {
            State::Open { opened_at, .. } => Some(opened_at),
            State::Closed => None,
        }
    }

    /// The time at which the resource was last returned to the pool.
    pub fn last_used(&self) -> Option<Instant> {
        match self.state {
            State::Open { last_used, .. } => last_used,
            State::Closed => None,
        }
    }

    /// The number of checkouts since the resource was last opened.
    pub fn usage_count(&self) -> Option<usize> {
        match self.state {
            State::Open { usage_count, .. } => Some(usage_count),
            State::Closed => None,
        }
    }

    pub(crate) fn open(&mut self, now: Instant) {
        self.state = State::Open {
            opened_at: now,
            last_used: None,
            usage_count: 0,
        };
    }

    pub(crate) fn close(&mut self) {
        self.state = State::Closed;
    }

    /// Count a checkout. Has no effect on a closed record.
    pub(crate) fn record_checkout(&mut self) {
        if let State::Open {
            ref mut usage_count,
            ..
        } = self.state
        {
            *usage_count += 1;
        }
    }

    /// Stamp the release time. Has no effect on a closed record.
    pub(crate) fn mark_used(&mut self, now: Instant) {
        if let State::Open {
            ref mut last_used, ..
        } = self.state
        {
            last_used.replace(now);
        }
    }
}

impl Default for ResourceInfo {
    fn default() -> Self {
        Self::closed()
    }
}
