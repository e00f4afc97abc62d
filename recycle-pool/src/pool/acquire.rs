use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use event_listener::EventListener;
use futures_lite::future::FutureExt;

use super::error::AcquireError;
use super::pool::Pool;
use crate::resource::{Managed, Resource};

enum AcquireState {
    Init,
    Waiting(EventListener),
}

/// A Future resolving to a `Managed<R>` or an `AcquireError`.
pub struct Acquire<R: Resource> {
    pool: Pool<R>,
    state: Option<AcquireState>,
}

impl<R: Resource> Acquire<R> {
    pub(crate) fn new(pool: Pool<R>) -> Self {
        Self {
            pool,
            state: Some(AcquireState::Init),
        }
    }

    fn is_waiting(&self) -> bool {
        matches!(self.state, Some(AcquireState::Waiting(_)))
    }
}

impl<R: Resource> Debug for Acquire<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquire")
            .field("pool", &self.pool)
            .field("waiting", &self.is_waiting())
            .finish()
    }
}

impl<R: Resource> Future for Acquire<R> {
    type Output = Result<Managed<R>, AcquireError<R::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.state.is_none() {
            // future already completed
            return Poll::Ready(Err(AcquireError::Completed));
        }
        let shared = this.pool.shared.clone();
        loop {
            // Check the idle stack before every wait, a push may have raced
            // with registering the listener
            if let Some(slot) = shared.idle.try_pop() {
                if let Some(AcquireState::Waiting(_)) = this.state.take() {
                    shared.counters.leave_wait();
                }
                return Poll::Ready(shared.checkout(slot));
            }

            this.state = match this.state.take() {
                Some(AcquireState::Init) => {
                    shared.counters.enter_wait();
                    Some(AcquireState::Waiting(shared.idle.listen()))
                }
                Some(AcquireState::Waiting(mut listener)) => match listener.poll(cx) {
                    Poll::Ready(()) => Some(AcquireState::Waiting(shared.idle.listen())),
                    Poll::Pending => {
                        this.state.replace(AcquireState::Waiting(listener));
                        return Poll::Pending;
                    }
                },
                None => unreachable!(),
            };
        }
    }
}

impl<R: Resource> Drop for Acquire<R> {
    fn drop(&mut self) {
        if self.is_waiting() {
            self.pool.shared.counters.leave_wait();
        }
    }
}
