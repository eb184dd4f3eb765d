//! Retry policy with linear backoff.
//!
//! Retry `i` (1-based) waits `i × base_delay` before it runs, so the
//! defaults produce 500ms, 1s, 1.5s. Only transport failures are retried;
//! an HTTP error status is a response, not a failure.

use crate::base::neterror::NetError;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default backoff unit.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Reasons for retrying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    NameNotResolved,
    ConnectionRefused,
    ConnectionReset,
    ConnectionClosed,
    ConnectionAborted,
    ConnectionFailed,
    AddressUnreachable,
    TlsHandshakeFailed,
    /// Server closed the connection without a response.
    EmptyResponse,
    Timeout,
}

impl RetryReason {
    /// Map a NetError to a RetryReason, if the error is retryable.
    pub fn from_error(error: &NetError) -> Option<Self> {
        let reason = match error {
            NetError::NameNotResolved => Self::NameNotResolved,
            NetError::ConnectionRefused => Self::ConnectionRefused,
            NetError::ConnectionReset => Self::ConnectionReset,
            NetError::ConnectionClosed => Self::ConnectionClosed,
            NetError::ConnectionAborted => Self::ConnectionAborted,
            NetError::ConnectionFailed => Self::ConnectionFailed,
            NetError::AddressUnreachable => Self::AddressUnreachable,
            NetError::SslProtocolError => Self::TlsHandshakeFailed,
            NetError::EmptyResponse => Self::EmptyResponse,
            NetError::ConnectionTimedOut => Self::Timeout,
            _ => return None,
        };
        debug_assert!(error.is_transport());
        Some(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based). `0` is the first
    /// attempt, which never waits.
    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = u32::try_from(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// True when another attempt is allowed after `retries_done` retries.
    pub fn should_retry(&self, retries_done: usize) -> bool {
        retries_done < self.max_retries
    }

    /// Upper bound on attempts for one logical request.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    /// The full delay schedule: one entry per retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_retries).map(|i| self.delay_for(i))
    }
}
