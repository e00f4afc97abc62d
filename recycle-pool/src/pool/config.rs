use std::sync::Arc;
use std::time::Duration;

use super::{ConfigError, Pool, RecyclePolicy};
use crate::resource::{Resource, ResourceInfo};
use crate::shared::{ErrorFn, ReleaseFn, Shared};

pub(crate) const DEFAULT_NAME: &str = "pool";

/// Builder for a `Pool` instance.
pub struct PoolConfig<R: Resource> {
    acquire_timeout: Option<Duration>,
    capacity: usize,
    handle_error: Option<ErrorFn<R::Error>>,
    name: Option<String>,
    on_release: Option<ReleaseFn<R>>,
    policy: RecyclePolicy,
}

impl<R: Resource> PoolConfig<R> {
    pub fn new(capacity: usize) -> Self {
        Self {
            acquire_timeout: None,
            capacity,
            handle_error: None,
            name: None,
            on_release: None,
            policy: RecyclePolicy::default(),
        }
    }

    /// Limit how long `acquire` waits for a resource. A zero duration
    /// restores the default of waiting indefinitely.
    pub fn acquire_timeout(mut self, val: Duration) -> Self {
        if val.as_micros() > 0 {
            self.acquire_timeout.replace(val);
        } else {
            self.acquire_timeout.take();
        }
        self
    }

    /// Receive errors raised when closing a recycled resource.
    pub fn handle_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(R::Error) + Send + Sync + 'static,
    {
        self.handle_error.replace(Box::new(handler));
        self
    }

    pub fn max_idle_time(mut self, val: Option<Duration>) -> Self {
        self.policy.max_idle_time = val;
        self
    }

    pub fn max_open_time(mut self, val: Option<Duration>) -> Self {
        self.policy.max_open_time = val;
        self
    }

    pub fn max_usage_count(mut self, val: Option<usize>) -> Self {
        self.policy.max_usage_count = val;
        self
    }

    /// Set the name used to identify the pool in log messages.
    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.name.replace(val.into());
        self
    }

    pub fn policy(mut self, val: RecyclePolicy) -> Self {
        self.policy = val;
        self
    }

    /// Inspect each open resource as it is released. Returning `false`
    /// closes the resource before it goes back into the pool.
    pub fn release<F>(mut self, release: F) -> Self
    where
        F: Fn(&mut R, ResourceInfo) -> bool + Send + Sync + 'static,
    {
        self.on_release.replace(Box::new(release));
        self
    }

    /// Create the pool. It starts out empty: resources are added with
    /// `Pool::insert`.
    pub fn build(self) -> Result<Pool<R>, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let shared = Shared::new(
            self.name.unwrap_or_else(|| DEFAULT_NAME.to_owned()),
            self.capacity,
            self.policy,
            self.acquire_timeout,
            self.handle_error,
            self.on_release,
        );
        Ok(Pool::from_shared(Arc::new(shared)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Resource for Noop {
        type Error = ();

        fn open(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn config_zero_capacity() {
        assert!(matches!(
            PoolConfig::<Noop>::new(0).build(),
            Err(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn config_settings() {
        let pool = PoolConfig::<Noop>::new(3)
            .name("test")
            .acquire_timeout(Duration::from_secs(1))
            .acquire_timeout(Duration::from_secs(0))
            .max_idle_time(None)
            .max_usage_count(Some(7))
            .build()
            .unwrap();
        assert_eq!(pool.name(), "test");
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.acquire_timeout(), None);
        assert_eq!(
            pool.policy(),
            &RecyclePolicy {
                max_idle_time: None,
                max_open_time: Some(Duration::from_secs(300)),
                max_usage_count: Some(7),
            }
        );
    }
}
