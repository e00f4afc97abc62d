use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::acquire::Acquire;
use super::config::DEFAULT_NAME;
use super::{AcquireError, InsertError, PoolStats, RecyclePolicy, ReleaseError};
use crate::resource::{Managed, Resource};
use crate::shared::Shared;

/// A bounded pool of resources of type `R`.
///
/// The pool is created empty and the owner inserts each (closed) resource.
/// Resources are handed out most-recently-released first, opened on demand,
/// and closed on release once they pass the limits of the pool's
/// `RecyclePolicy`.
pub struct Pool<R: Resource> {
    pub(crate) shared: Arc<Shared<R>>,
}

impl<R: Resource> Pool<R> {
    /// Create an empty pool holding at most `capacity` resources.
    ///
    /// Panics if `capacity` is zero. `PoolConfig` reports this as an error.
    pub fn new(capacity: usize, policy: RecyclePolicy) -> Self {
        assert_ne!(capacity, 0, "pool capacity must be greater than zero");
        let shared = Shared::new(DEFAULT_NAME.to_owned(), capacity, policy, None, None, None);
        Self::from_shared(Arc::new(shared))
    }

    pub(crate) fn from_shared(shared: Arc<Shared<R>>) -> Self {
        Self { shared }
    }

    /// Add a closed resource to the pool. Fails once `capacity` resources
    /// have been inserted.
    pub fn insert(&self, resource: R) -> Result<(), InsertError<R>> {
        self.shared.insert(resource)
    }

    /// Insert each resource in turn, stopping at the first failure.
    pub fn extend<I>(&self, resources: I) -> Result<(), InsertError<R>>
    where
        I: IntoIterator<Item = R>,
    {
        resources.into_iter().try_for_each(|res| self.insert(res))
    }

    /// Check out a resource, blocking the current thread until one is
    /// available or the acquire timeout (if configured) passes.
    pub fn acquire(&self) -> Result<Managed<R>, AcquireError<R::Error>> {
        let slot = match self.shared.idle.try_pop() {
            Some(slot) => slot,
            None => {
                // an unrepresentable deadline waits indefinitely
                let deadline = self
                    .shared
                    .acquire_timeout
                    .and_then(|dur| Instant::now().checked_add(dur));
                let _waiting = self.shared.counters.wait();
                self.shared
                    .idle
                    .pop(deadline)
                    .ok_or(AcquireError::Timeout)?
            }
        };
        self.shared.checkout(slot)
    }

    /// Returns an `Acquire<R>`, a `Future` resolving to a resource handle.
    /// The acquire timeout does not apply: wrap the future in a timer if
    /// one is required.
    pub fn acquire_async(&self) -> Acquire<R> {
        Acquire::new(self.clone())
    }

    /// Check out a resource if one is immediately available.
    pub fn try_acquire(&self) -> Result<Option<Managed<R>>, AcquireError<R::Error>> {
        match self.shared.idle.try_pop() {
            Some(slot) => self.shared.checkout(slot).map(Some),
            None => Ok(None),
        }
    }

    /// Return a resource handle to the pool. Equivalent to dropping the
    /// handle, except that a handle belonging to another pool is rejected.
    pub fn release(&self, handle: Managed<R>) -> Result<(), ReleaseError<R>> {
        if handle.belongs_to(&self.shared) {
            drop(handle);
            Ok(())
        } else {
            Err(ReleaseError::InvalidRelease(handle))
        }
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.shared.acquire_timeout
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Fetch the number of resources currently in the pool (not checked out).
    pub fn idle_count(&self) -> usize {
        self.shared.idle.len()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn policy(&self) -> &RecyclePolicy {
        &self.shared.policy
    }

    /// Fetch the number of resources inserted into the pool.
    pub fn size(&self) -> usize {
        self.shared.size()
    }

    pub fn stats(&self) -> PoolStats {
        self.shared.stats()
    }
}

impl<R: Resource> Clone for Pool<R> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<R: Resource> Debug for Pool<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name())
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .field("idle", &self.idle_count())
            .finish()
    }
}
