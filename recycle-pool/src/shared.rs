use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, trace, warn};

use crate::pool::{
    AcquireError, Counters, IdleStack, InsertError, PoolStats, RecyclePolicy, RecycleReason,
};
use crate::resource::{Managed, Resource, ResourceInfo, Slot};

pub type ErrorFn<E> = Box<dyn Fn(E) + Send + Sync>;

pub type ReleaseFn<R> = Box<dyn Fn(&mut R, ResourceInfo) -> bool + Send + Sync>;

/// State shared between a pool and its outstanding resource handles.
pub struct Shared<R: Resource> {
    pub(crate) acquire_timeout: Option<Duration>,
    pub(crate) capacity: usize,
    pub(crate) counters: Counters,
    pub(crate) handle_error: Option<ErrorFn<R::Error>>,
    pub(crate) idle: IdleStack<Slot<R>>,
    pub(crate) name: String,
    pub(crate) on_release: Option<ReleaseFn<R>>,
    pub(crate) policy: RecyclePolicy,
    pub(crate) size: AtomicUsize,
}

impl<R: Resource> Shared<R> {
    pub fn new(
        name: String,
        capacity: usize,
        policy: RecyclePolicy,
        acquire_timeout: Option<Duration>,
        handle_error: Option<ErrorFn<R::Error>>,
        on_release: Option<ReleaseFn<R>>,
    ) -> Self {
        Self {
            acquire_timeout,
            capacity,
            counters: Counters::default(),
            handle_error,
            idle: IdleStack::new(capacity),
            name,
            on_release,
            policy,
            size: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats::collect(self.capacity, self.size(), self.idle.len(), &self.counters)
    }

    /// Add a new closed resource, reserving one unit of capacity for it.
    pub fn insert(&self, resource: R) -> Result<(), InsertError<R>> {
        let mut size = self.size();
        loop {
            if size >= self.capacity {
                return Err(InsertError::CapacityExceeded {
                    resource,
                    capacity: self.capacity,
                });
            }
            match self.size.compare_exchange_weak(
                size,
                size + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(s) => size = s,
            }
        }
        if let Err(slot) = self.idle.push(Slot::new(resource)) {
            // Cannot happen while the size reservation holds
            self.size.fetch_sub(1, Ordering::AcqRel);
            return Err(InsertError::CapacityExceeded {
                resource: slot.resource,
                capacity: self.capacity,
            });
        }
        trace!("{}: inserted resource ({} of {})", self.name, size + 1, self.capacity);
        Ok(())
    }

    /// Hand out a resource taken from the idle stack, opening it first if
    /// it is closed. On an open failure the resource goes back to the stack.
    pub fn checkout(
        self: &Arc<Self>,
        slot: Slot<R>,
    ) -> Result<Managed<R>, AcquireError<R::Error>> {
        let mut slot = SlotGuard::new(self, slot);
        if !slot.info.is_open() {
            if let Err(err) = slot.resource.open() {
                Counters::incr(&self.counters.open_failures);
                warn!("{}: error opening resource: {:?}", self.name, err);
                self.restore(slot.into_inner());
                return Err(AcquireError::Open(err));
            }
            slot.info.open(Instant::now());
            Counters::incr(&self.counters.opened);
            debug!("{}: opened resource", self.name);
        }
        slot.info.record_checkout();
        Counters::incr(&self.counters.taken);
        trace!("{}: took resource {:?}", self.name, slot.info);
        Ok(Managed::new(slot.into_inner(), self.clone()))
    }

    /// Return a checked out resource to the idle stack, closing it first if
    /// it is due to be recycled.
    pub fn release(&self, slot: Slot<R>, discard: bool) {
        let mut slot = SlotGuard::new(self, slot);
        let now = Instant::now();
        let reason = if !slot.info.is_open() {
            None
        } else if discard {
            Some(RecycleReason::Discarded)
        } else if !self.verify_release(&mut slot) {
            Some(RecycleReason::Rejected)
        } else {
            // Idle time is measured against the previous release stamp
            self.policy.evaluate(&slot.info, now)
        };
        slot.info.mark_used(now);
        if let Some(reason) = reason {
            self.recycle(&mut slot, reason);
        }
        Counters::incr(&self.counters.returned);
        trace!("{}: put resource {:?}", self.name, slot.info);
        self.restore(slot.into_inner());
    }

    fn verify_release(&self, slot: &mut Slot<R>) -> bool {
        match self.on_release.as_ref() {
            Some(verify) => verify(&mut slot.resource, slot.info),
            None => true,
        }
    }

    fn recycle(&self, slot: &mut Slot<R>, reason: RecycleReason) {
        debug!(
            "{}: recycling resource ({}): {:?}",
            self.name, reason, slot.info
        );
        if let Err(err) = slot.resource.close() {
            Counters::incr(&self.counters.close_failures);
            warn!("{}: error closing resource: {:?}", self.name, err);
            self.handle_error(err);
        }
        // The record is closed even on failure so the next checkout reopens
        slot.info.close();
        Counters::incr(&self.counters.closed);
    }

    fn restore(&self, slot: Slot<R>) {
        if self.idle.push(slot).is_err() {
            self.size.fetch_sub(1, Ordering::AcqRel);
            error!(
                "{}: idle stack full on release, dropping resource",
                self.name
            );
        }
    }

    pub fn handle_error(&self, err: R::Error) {
        if let Some(handler) = self.handle_error.as_ref() {
            (handler)(err)
        }
    }
}

/// Holds a slot while resource callbacks run. If one of them panics, the
/// slot goes back to the idle stack with the record left as of the last
/// completed transition, so the pool keeps its capacity.
struct SlotGuard<'s, R: Resource> {
    shared: &'s Shared<R>,
    slot: Option<Slot<R>>,
}

impl<'s, R: Resource> SlotGuard<'s, R> {
    fn new(shared: &'s Shared<R>, slot: Slot<R>) -> Self {
        Self {
            shared,
            slot: Some(slot),
        }
    }

    fn into_inner(mut self) -> Slot<R> {
        // note: the slot is only taken here or on drop
        self.slot.take().unwrap()
    }
}

impl<R: Resource> Deref for SlotGuard<'_, R> {
    type Target = Slot<R>;
    fn deref(&self) -> &Self::Target {
        self.slot.as_ref().unwrap()
    }
}

impl<R: Resource> DerefMut for SlotGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.slot.as_mut().unwrap()
    }
}

impl<R: Resource> Drop for SlotGuard<'_, R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            error!(
                "{}: resource callback panicked, returning resource {:?}",
                self.shared.name, slot.info
            );
            self.shared.restore(slot);
        }
    }
}
