//! Session configuration.
//!
//! A [`SessionConfig`] is the mutable half of a client. The client keeps it
//! behind a lock and copies it out when a call begins, so reconfiguring a
//! shared client never affects a call that is already running.

use crate::http::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::http::transaction::TransactionSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Nexus/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Client settings. Durations are (de)serialized as integer milliseconds:
///
/// ```json
/// { "user_agent": "Nexus/1.0", "timeout": 30000, "max_retries": 3,
///   "base_delay": 500, "max_redirects": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sent unless the request supplies its own `User-Agent`.
    pub user_agent: String,
    /// Per-attempt timeout; zero disables it.
    #[serde(with = "millis")]
    pub timeout: Duration,
    pub max_retries: usize,
    #[serde(with = "millis")]
    pub base_delay: Duration,
    /// Zero disables redirect following.
    pub max_redirects: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl SessionConfig {
    /// Parse from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.base_delay)
    }

    pub(crate) fn transaction_settings(&self) -> TransactionSettings {
        TransactionSettings {
            retry: self.retry_policy(),
            timeout: self.timeout,
            max_redirects: self.max_redirects,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
