use std::fmt::{self, Debug, Formatter};

use thiserror::Error;

use crate::resource::{Managed, Resource};

/// An error during resource acquisition.
#[derive(Debug, Error)]
pub enum AcquireError<E> {
    /// Wraps an error result from the resource's `open`. The resource has
    /// been returned to the pool in a closed state.
    #[error("failed to open resource: {0:?}")]
    Open(E),
    /// No resource became available before the acquire timeout
    #[error("timed out waiting for a resource")]
    Timeout,
    /// An `Acquire` future was polled again after it resolved
    #[error("acquire already completed")]
    Completed,
}

impl<E> AcquireError<E> {
    pub fn into_open_error(self) -> Option<E> {
        match self {
            Self::Open(err) => Some(err),
            Self::Timeout | Self::Completed => None,
        }
    }
}

/// A configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,
}

/// An error adding a resource to a pool.
#[derive(Error)]
pub enum InsertError<R> {
    /// The pool already holds `capacity` resources. The rejected resource
    /// is handed back.
    #[error("pool capacity of {capacity} exceeded")]
    CapacityExceeded { resource: R, capacity: usize },
}

impl<R> InsertError<R> {
    pub fn into_inner(self) -> R {
        match self {
            Self::CapacityExceeded { resource, .. } => resource,
        }
    }
}

impl<R> Debug for InsertError<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity, .. } => f
                .debug_struct("InsertError::CapacityExceeded")
                .field("capacity", capacity)
                .finish(),
        }
    }
}

/// An error returning a resource handle to a pool.
#[derive(Error)]
pub enum ReleaseError<R: Resource> {
    /// The handle was acquired from another pool. The handle is passed back
    /// unchanged and is returned to its own pool when dropped.
    #[error("resource handle was acquired from a different pool")]
    InvalidRelease(Managed<R>),
}

impl<R: Resource> ReleaseError<R> {
    pub fn into_inner(self) -> Managed<R> {
        match self {
            Self::InvalidRelease(handle) => handle,
        }
    }
}

impl<R: Resource> Debug for ReleaseError<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRelease(handle) => f
                .debug_tuple("ReleaseError::InvalidRelease")
                .field(handle)
                .finish(),
        }
    }
}
