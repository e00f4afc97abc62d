use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Running counters maintained by a pool.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub open_failures: AtomicUsize,
    pub close_failures: AtomicUsize,
    pub taken: AtomicUsize,
    pub returned: AtomicUsize,
    pub waiting: AtomicUsize,
}

impl Counters {
    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enter_wait(&self) {
        self.waiting.fetch_add(1, Ordering::AcqRel);
    }

    pub fn leave_wait(&self) {
        self.waiting.fetch_sub(1, Ordering::AcqRel);
    }

    /// Count the current thread as waiting until the returned guard is
    /// dropped.
    pub fn wait(&self) -> WaitGuard<'_> {
        self.enter_wait();
        WaitGuard { counters: self }
    }
}

pub(crate) struct WaitGuard<'a> {
    counters: &'a Counters,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.counters.leave_wait();
    }
}

/// A point-in-time snapshot of pool usage.
///
/// The counters are read individually, so a snapshot taken while other
/// threads are acquiring or releasing may be slightly inconsistent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// The maximum number of resources
    pub capacity: usize,
    /// The number of resources inserted into the pool
    pub size: usize,
    /// Resources currently sitting in the pool
    pub idle: usize,
    /// Resources currently checked out
    pub in_use: usize,
    /// Callers currently waiting for a resource
    pub waiting: usize,
    /// Total successful opens
    pub opened: usize,
    /// Total closes performed by recycling
    pub closed: usize,
    pub open_failures: usize,
    pub close_failures: usize,
    /// Total successful acquisitions
    pub taken: usize,
    /// Total releases
    pub returned: usize,
}

impl PoolStats {
    pub(crate) fn collect(capacity: usize, size: usize, idle: usize, counters: &Counters) -> Self {
        let load = |c: &AtomicUsize| c.load(Ordering::Acquire);
        Self {
            capacity,
            size,
            idle,
            in_use: size.saturating_sub(idle),
            waiting: load(&counters.waiting),
            opened: load(&counters.opened),
            closed: load(&counters.closed),
            open_failures: load(&counters.open_failures),
            close_failures: load(&counters.close_failures),
            taken: load(&counters.taken),
            returned: load(&counters.returned),
        }
    }

    /// The share of inserted resources currently checked out, as a
    /// percentage.
    pub fn utilization(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.in_use as f64 * 100.0 / self.size as f64
        }
    }
}

impl Display for PoolStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity: {}, size: {}, in use: {} ({:.2}%), idle: {}, waiting: {}, \
             opened: {}, closed: {}, taken: {}, returned: {}, failures: {}/{}",
            self.capacity,
            self.size,
            self.in_use,
            self.utilization(),
            self.idle,
            self.waiting,
            self.opened,
            self.closed,
            self.taken,
            self.returned,
            self.open_failures,
            self.close_failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_wait_guard() {
        let counters = Counters::default();
        let a = counters.wait();
        let b = counters.wait();
        assert_eq!(PoolStats::collect(2, 2, 0, &counters).waiting, 2);
        drop(a);
        drop(b);
        assert_eq!(PoolStats::collect(2, 2, 0, &counters).waiting, 0);
    }

    #[test]
    fn stats_utilization() {
        let counters = Counters::default();
        Counters::incr(&counters.taken);
        let stats = PoolStats::collect(4, 4, 1, &counters);
        assert_eq!(stats.in_use, 3);
        assert_eq!(stats.taken, 1);
        assert!((stats.utilization() - 75.0).abs() < f64::EPSILON);
        assert_eq!(PoolStats::default().utilization(), 0.0);
    }
}
