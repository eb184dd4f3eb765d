//! Fully buffered HTTP response.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use bytes::Bytes;
use http::StatusCode;
use url::Url;

/// Response with the whole body read into memory.
///
/// Any status code is a successful result at this layer; 404 and 500 are
/// returned like 200 and it is up to the caller to inspect [`status`].
///
/// [`status`]: HttpResponse::status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    headers: OrderedHeaderMap,
    body: Bytes,
    url: Url,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: OrderedHeaderMap, body: Bytes, url: Url) -> Self {
        Self {
            status,
            headers,
            body,
            url,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_str(name)
    }

    /// URL of the final hop after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::debug!(url = %self.url, error = %e, "response body is not valid JSON");
            NetError::JsonParseError
        })
    }

    pub(crate) fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }
}
