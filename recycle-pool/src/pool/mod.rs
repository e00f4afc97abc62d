mod acquire;
pub use acquire::Acquire;

mod config;
pub use config::PoolConfig;

mod error;
pub use error::{AcquireError, ConfigError, InsertError, ReleaseError};

mod idle;
pub(crate) use idle::IdleStack;

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;

mod recycle;
pub use recycle::{RecyclePolicy, RecycleReason};

mod stats;
pub(crate) use stats::Counters;
pub use stats::PoolStats;
