//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): Network error codes matching `net_error_list.h`
//! - [`IoResultExt`](context::IoResultExt): IO error to `NetError` mapping
//! - [`ErrorKind`](neterror::ErrorKind): request / transport / protocol classification

pub mod context;
pub mod neterror;
