//! Ergonomic error context helpers.
//!
//! Converts IO errors raised while connecting into `NetError` codes, logging
//! the host and port that failed so the flattened code still has a trail.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Map a connect-phase IO error, recording which endpoint failed.
    ///
    /// # Example
    /// ```ignore
    /// use nexusnet::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Map a DNS lookup IO error to `NameNotResolved`.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| {
            let err = NetError::from_io(&e);
            tracing::debug!(host = %host, port, error = %e, code = err.as_i32(), "connect failed");
            err
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(domain = %domain, error = %e, "DNS resolution failed");
            NetError::NameNotResolved
        })
    }
}
