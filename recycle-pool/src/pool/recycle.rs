use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::resource::ResourceInfo;

const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(300);
const DEFAULT_MAX_OPEN_TIME: Duration = Duration::from_secs(300);
const DEFAULT_MAX_USAGE_COUNT: usize = 1000;

/// The rules deciding whether an open resource is closed when it is returned
/// to the pool. A `None` or zero value disables the corresponding rule, the
/// same as in serialized form.
///
/// Idle time is measured from the previous release of the resource, so a
/// resource released for the first time after opening is never considered
/// idle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecyclePolicy {
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub max_idle_time: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub max_open_time: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(with = "count"))]
    pub max_usage_count: Option<usize>,
}

impl RecyclePolicy {
    /// A policy which never recycles a resource.
    pub const fn disabled() -> Self {
        Self {
            max_idle_time: None,
            max_open_time: None,
            max_usage_count: None,
        }
    }

    /// Check the recycling rules against the lifecycle record of a resource
    /// at the time `now`, returning the first rule that applies.
    pub fn evaluate(&self, info: &ResourceInfo, now: Instant) -> Option<RecycleReason> {
        if !info.is_open() {
            return None;
        }
        let elapsed = |since: Option<Instant>, limit: Option<Duration>| match (since, limit) {
            (Some(since), Some(limit)) if limit > Duration::ZERO => {
                now.saturating_duration_since(since) > limit
            }
            _ => false,
        };
        if elapsed(info.last_used(), self.max_idle_time) {
            Some(RecycleReason::MaxIdle)
        } else if elapsed(info.last_opened(), self.max_open_time) {
            Some(RecycleReason::MaxOpen)
        } else if matches!(
            (info.usage_count(), self.max_usage_count),
            (Some(count), Some(max)) if max > 0 && count >= max
        ) {
            Some(RecycleReason::MaxUsage)
        } else {
            None
        }
    }
}

impl Default for RecyclePolicy {
    fn default() -> Self {
        Self {
            max_idle_time: Some(DEFAULT_MAX_IDLE_TIME),
            max_open_time: Some(DEFAULT_MAX_OPEN_TIME),
            max_usage_count: Some(DEFAULT_MAX_USAGE_COUNT),
        }
    }
}

/// The cause of a resource being closed on release.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecycleReason {
    /// The resource sat unused for longer than `max_idle_time`
    MaxIdle,
    /// The resource has been open for longer than `max_open_time`
    MaxOpen,
    /// The resource was checked out `max_usage_count` times
    MaxUsage,
    /// The pool's release callback declined the resource
    Rejected,
    /// The holder of the handle discarded the resource
    Discarded,
}

impl Display for RecycleReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaxIdle => "idle time exceeded",
            Self::MaxOpen => "open time exceeded",
            Self::MaxUsage => "usage count exceeded",
            Self::Rejected => "rejected on release",
            Self::Discarded => "discarded",
        })
    }
}

// Durations are written as fractional seconds, zero disables the rule.
#[cfg(feature = "serde")]
mod seconds {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(val.map(|d| d.as_secs_f64()).unwrap_or(0.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = f64::deserialize(d)?;
        if secs == 0.0 {
            return Ok(None);
        }
        Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|err| D::Error::custom(format!("invalid duration {}: {}", secs, err)))
    }
}

#[cfg(feature = "serde")]
mod count {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(val: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(val.unwrap_or(0) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let count = usize::deserialize(d)?;
        Ok(if count == 0 { None } else { Some(count) })
    }
}
