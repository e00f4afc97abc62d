//! A bounded pool of reusable resources which are opened on first use and
//! recycled once they exceed a configured idle time, open time or usage
//! count.

mod pool;
pub use self::pool::{
    Acquire, AcquireError, ConfigError, InsertError, Pool, PoolConfig, PoolStats, RecyclePolicy,
    RecycleReason, ReleaseError,
};

mod resource;
pub use self::resource::{Managed, Resource, ResourceInfo};

mod shared;
