//! Socket and connection setup.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`stream`]: plain or TLS socket behind one `AsyncRead + AsyncWrite` type
//! - [`tls`]: TLS configuration with BoringSSL

pub mod connectjob;
pub mod stream;
pub mod tls;
