//! The seam between request policy (cookies, retries, redirects) and the
//! wire. Production code uses [`HttpStreamFactory`]; tests swap in a
//! scripted transport to observe attempts without touching the network.
//!
//! [`HttpStreamFactory`]: crate::http::streamfactory::HttpStreamFactory

use crate::base::neterror::NetError;
use crate::http::request::PreparedRequest;
use crate::http::response::HttpResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by [`Transport::send`].
pub type Sending = Pin<Box<dyn Future<Output = Result<HttpResponse, NetError>> + Send>>;

/// Performs a single HTTP exchange.
///
/// One call is one attempt: implementations must not retry, follow
/// redirects or touch cookies. The response carries the request URL.
pub trait Transport: Send + Sync {
    fn send(&self, request: PreparedRequest) -> Sending;
}

/// Blanket implementation for Arc-wrapped transports.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: PreparedRequest) -> Sending {
        (**self).send(request)
    }
}
