use std::fmt::{self, Debug, Display, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{Resource, ResourceInfo};
use crate::shared::Shared;

/// A pooled resource together with its lifecycle record.
pub(crate) struct Slot<R> {
    pub resource: R,
    pub info: ResourceInfo,
}

impl<R> Slot<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource,
            info: ResourceInfo::closed(),
        }
    }
}

/// An acquired resource. The resource is returned to its pool when this
/// handle is dropped or passed to `Pool::release`.
pub struct Managed<R: Resource> {
    shared: Option<Arc<Shared<R>>>,
    slot: Option<Slot<R>>,
    discard: bool,
}

impl<R: Resource> Managed<R> {
    pub(crate) fn new(slot: Slot<R>, shared: Arc<Shared<R>>) -> Self {
        Self {
            shared: Some(shared),
            slot: Some(slot),
            discard: false,
        }
    }

    /// Mark the resource to be closed when it is released, regardless of
    /// the pool's recycling policy.
    pub fn discard(mng_self: &mut Self) {
        mng_self.discard = true;
    }

    pub fn is_discarded(mng_self: &Self) -> bool {
        mng_self.discard
    }

    /// Fetch the lifecycle record of the resource as of its checkout.
    pub fn info(mng_self: &Self) -> &ResourceInfo {
        &mng_self.slot.as_ref().unwrap().info
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<Shared<R>>) -> bool {
        self.shared
            .as_ref()
            .map(|s| Arc::ptr_eq(s, shared))
            .unwrap_or(false)
    }
}

impl<R: Resource> Debug for Managed<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("info", Self::info(self))
            .field("discard", &self.discard)
            .finish()
    }
}

impl<R: Resource + Display> Display for Managed<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.deref(), f)
    }
}

impl<R: Resource> Deref for Managed<R> {
    type Target = R;
    fn deref(&self) -> &Self::Target {
        // note: panics after drop when value is taken
        &self.slot.as_ref().unwrap().resource
    }
}

impl<R: Resource> DerefMut for Managed<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // note: panics after drop when value is taken
        &mut self.slot.as_mut().unwrap().resource
    }
}

impl<R: Resource> Drop for Managed<R> {
    fn drop(&mut self) {
        if let (Some(shared), Some(slot)) = (self.shared.take(), self.slot.take()) {
            shared.release(slot, self.discard);
        }
    }
}
