use thiserror::Error;

/// Network error codes.
///
/// Codes below -9999 are crate-specific; everything else keeps the value
/// Chromium assigns in `net_error_list.h` so logs stay comparable.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Address unreachable")]
    AddressUnreachable,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // Request Errors
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,
    #[error("Method not supported")]
    MethodNotSupported,
    #[error("Invalid header")]
    InvalidHeader,

    // HTTP Errors
    #[error("Invalid redirect")]
    InvalidRedirect,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Failed to read HTTP body")]
    HttpBodyError,
    #[error("Failed to parse JSON body")]
    JsonParseError,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

/// Coarse classification of a [`NetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before any network I/O.
    InvalidRequest,
    /// DNS, connect, TLS or timeout failure. Eligible for retry.
    Transport,
    /// A response arrived but could not be used.
    Protocol,
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::SslProtocolError => -107,
            NetError::AddressUnreachable => -109,
            NetError::ConnectionTimedOut => -118,
            NetError::InvalidArgument => -4,
            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,
            NetError::InvalidRedirect => -303,
            NetError::TooManyRedirects => -310,
            NetError::InvalidResponse => -320,
            NetError::MethodNotSupported => -322,
            NetError::EmptyResponse => -324,
            NetError::InvalidHeader => -10001,
            NetError::HttpBodyError => -10002,
            NetError::JsonParseError => -10003,
            NetError::Unknown(code) => *code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NetError::InvalidArgument
            | NetError::InvalidUrl
            | NetError::DisallowedUrlScheme
            | NetError::MethodNotSupported
            | NetError::InvalidHeader => ErrorKind::InvalidRequest,
            NetError::ConnectionClosed
            | NetError::ConnectionReset
            | NetError::ConnectionRefused
            | NetError::ConnectionAborted
            | NetError::ConnectionFailed
            | NetError::NameNotResolved
            | NetError::SslProtocolError
            | NetError::AddressUnreachable
            | NetError::ConnectionTimedOut
            | NetError::EmptyResponse => ErrorKind::Transport,
            NetError::InvalidRedirect
            | NetError::TooManyRedirects
            | NetError::InvalidResponse
            | NetError::HttpBodyError
            | NetError::JsonParseError
            | NetError::Unknown(_) => ErrorKind::Protocol,
        }
    }

    /// True for errors raised before any network attempt was made.
    pub fn is_invalid_request(&self) -> bool {
        self.kind() == ErrorKind::InvalidRequest
    }

    /// True for DNS/connect/TLS/timeout failures.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Map an I/O error raised while connecting or exchanging bytes.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind as Io;
        match err.kind() {
            Io::ConnectionRefused => NetError::ConnectionRefused,
            Io::ConnectionReset => NetError::ConnectionReset,
            Io::ConnectionAborted => NetError::ConnectionAborted,
            Io::NotConnected | Io::BrokenPipe | Io::UnexpectedEof => NetError::ConnectionClosed,
            Io::TimedOut => NetError::ConnectionTimedOut,
            Io::AddrNotAvailable => NetError::AddressUnreachable,
            _ => NetError::ConnectionFailed,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -109 => NetError::AddressUnreachable,
            -118 => NetError::ConnectionTimedOut,
            -4 => NetError::InvalidArgument,
            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,
            -303 => NetError::InvalidRedirect,
            -310 => NetError::TooManyRedirects,
            -320 => NetError::InvalidResponse,
            -322 => NetError::MethodNotSupported,
            -324 => NetError::EmptyResponse,
            -10001 => NetError::InvalidHeader,
            -10002 => NetError::HttpBodyError,
            -10003 => NetError::JsonParseError,
            _ => NetError::Unknown(code),
        }
    }
}
