use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use event_listener::{Event, EventListener};

/// A bounded LIFO stack of idle entries. Threads and tasks waiting for an
/// entry are woken one at a time as entries are pushed.
pub(crate) struct IdleStack<T> {
    available: Event,
    capacity: usize,
    items: Mutex<Vec<T>>,
}

impl<T> IdleStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            available: Event::new(),
            capacity,
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    // A panic while holding the lock cannot leave the Vec half-updated
    fn items(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Register interest in the next push. The caller must check the stack
    /// again after listening to avoid missing a push that raced with it.
    pub fn listen(&self) -> EventListener {
        self.available.listen()
    }

    /// Push an entry onto the stack, returning it if the stack is full.
    pub fn push(&self, item: T) -> Result<(), T> {
        {
            let mut items = self.items();
            if items.len() >= self.capacity {
                return Err(item);
            }
            items.push(item);
        }
        self.available.notify_additional(1);
        Ok(())
    }

    /// Pop the most recently pushed entry, if any.
    pub fn try_pop(&self) -> Option<T> {
        self.items().pop()
    }

    /// Pop the most recently pushed entry, blocking the current thread until
    /// one is available. Returns `None` if the deadline passes first.
    pub fn pop(&self, deadline: Option<Instant>) -> Option<T> {
        loop {
            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            let listener = self.listen();
            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            match deadline {
                Some(deadline) => {
                    if !listener.wait_deadline(deadline) {
                        // one last look in case of a push at the deadline
                        return self.try_pop();
                    }
                }
                None => listener.wait(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn idle_stack_lifo() {
        let stack = IdleStack::new(3);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();
        assert_eq!(stack.push(4), Err(4));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.try_pop(), Some(3));
        assert_eq!(stack.try_pop(), Some(2));
        stack.push(5).unwrap();
        assert_eq!(stack.try_pop(), Some(5));
        assert_eq!(stack.try_pop(), Some(1));
        assert_eq!(stack.try_pop(), None);
    }

    #[test]
    fn idle_stack_pop_deadline() {
        let stack = IdleStack::<u32>::new(1);
        let start = Instant::now();
        assert_eq!(stack.pop(Some(start + Duration::from_millis(20))), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn idle_stack_pop_wakes() {
        let stack = Arc::new(IdleStack::new(1));
        let waiter = {
            let stack = stack.clone();
            thread::spawn(move || stack.pop(None))
        };
        thread::sleep(Duration::from_millis(20));
        stack.push(7).unwrap();
        assert_eq!(waiter.join().unwrap(), Some(7));
    }
}
