use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OutboxError;
use crate::grouping::GroupingMode;

/// Tunables of a [`TransactionalOutbox`](super::TransactionalOutbox).
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```ignore
/// let config = OutboxConfig::from_json(r#"{ "thread_pool_size": 4, "rerun_after_ms": 600000 }"#)?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    pub thread_pool_size: usize,
    pub thread_name_prefix: String,
    /// Maximum number of groups waiting for a worker; unbounded when `None`.
    pub queue_capacity: Option<usize>,
    /// How long `shutdown` waits for running groups before resetting queued ones.
    #[serde(rename = "thread_pool_timeout_ms", with = "millis")]
    pub thread_pool_timeout: Duration,
    /// How long a claimed item stays RUNNING before another cycle may re-claim it.
    #[serde(rename = "rerun_after_ms", with = "millis")]
    pub rerun_after: Duration,
    pub grouping: GroupingMode,
}

impl OutboxConfig {
    pub fn from_json(json: &str) -> Result<Self, OutboxError> {
        let config: OutboxConfig = serde_json::from_str(json)
            .map_err(|err| OutboxError::InvalidConfiguration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OutboxError> {
        if self.thread_pool_size == 0 {
            return Err(OutboxError::InvalidConfiguration(
                "thread_pool_size must be at least 1".to_string(),
            ));
        }
        if self.rerun_after.is_zero() {
            return Err(OutboxError::InvalidConfiguration(
                "rerun_after must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        OutboxConfig {
            thread_pool_size: 10,
            thread_name_prefix: "outbox-item-processor".to_string(),
            queue_capacity: None,
            thread_pool_timeout: Duration::from_secs(5),
            rerun_after: Duration::from_secs(60 * 60),
            grouping: GroupingMode::Grouped,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
