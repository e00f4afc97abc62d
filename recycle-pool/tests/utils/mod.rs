use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use recycle_pool::{Pool, PoolConfig, Resource};

pub struct AtomicCounter {
    count: AtomicUsize,
}

#[allow(unused)]
impl AtomicCounter {
    pub fn new(val: usize) -> Self {
        Self {
            count: AtomicUsize::new(val),
        }
    }

    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn decrement(&self) -> usize {
        self.count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn value(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn try_increment(&self, max: usize) -> Result<usize, usize> {
        let mut count = self.count.load(Ordering::SeqCst);
        if count < max {
            count = self.increment();
            if count > max {
                self.decrement();
                Err(count)
            } else {
                Ok(count)
            }
        } else {
            Err(count)
        }
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Shared record of what happened to a set of test resources.
#[derive(Default)]
pub struct Events {
    pub opened: AtomicCounter,
    pub closed: AtomicCounter,
    pub fail_open: AtomicBool,
    pub fail_close: AtomicBool,
    pub panic_open: AtomicBool,
}

#[allow(unused)]
impl Events {
    pub fn set_fail_open(&self, val: bool) {
        self.fail_open.store(val, Ordering::SeqCst);
    }

    pub fn set_fail_close(&self, val: bool) {
        self.fail_close.store(val, Ordering::SeqCst);
    }

    pub fn set_panic_open(&self, val: bool) {
        self.panic_open.store(val, Ordering::SeqCst);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TestError {
    Open(usize),
    Close(usize),
}

pub struct TestResource {
    pub id: usize,
    pub connected: bool,
    /// Number of times this resource has been opened
    pub generation: usize,
    events: Arc<Events>,
}

impl TestResource {
    pub fn new(id: usize, events: Arc<Events>) -> Self {
        Self {
            id,
            connected: false,
            generation: 0,
            events,
        }
    }
}

impl Resource for TestResource {
    type Error = TestError;

    fn open(&mut self) -> Result<(), TestError> {
        assert!(!self.connected, "resource opened twice");
        if self.events.panic_open.load(Ordering::SeqCst) {
            panic!("resource {} panicked on open", self.id);
        }
        if self.events.fail_open.load(Ordering::SeqCst) {
            return Err(TestError::Open(self.id));
        }
        self.connected = true;
        self.generation += 1;
        self.events.opened.increment();
        Ok(())
    }

    fn close(&mut self) -> Result<(), TestError> {
        self.connected = false;
        self.events.closed.increment();
        if self.events.fail_close.load(Ordering::SeqCst) {
            return Err(TestError::Close(self.id));
        }
        Ok(())
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a pool from `config` and fill it with resources numbered from 1.
pub fn filled_pool(config: PoolConfig<TestResource>) -> (Pool<TestResource>, Arc<Events>) {
    init_logger();
    let events = Arc::new(Events::default());
    let pool = config.build().unwrap();
    for id in 1..=pool.capacity() {
        pool.insert(TestResource::new(id, events.clone())).unwrap();
    }
    (pool, events)
}

#[allow(unused)]
pub fn spin_until<F: Fn() -> bool>(cond: F) {
    while !cond() {
        thread::yield_now();
    }
}
