//! Request descriptions and their validated form.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::requestbody::RequestBody;
use http::Method;
use std::time::Duration;
use url::Url;

/// A request as the caller describes it. Nothing is validated until
/// [`prepare`](Request::prepare) runs, so building one never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    /// Header pairs in the order the caller gave them.
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Per-attempt timeout overriding the session default.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>, body: impl Into<RequestBody>) -> Self {
        Self::new("POST", url).with_body(body)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Add a header only when the caller did not already supply one.
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if !self.has_header(name) {
            self.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Build a request from a script-style options object:
    /// `{ method, url, headers: {..}, body, timeout }`.
    ///
    /// `method` defaults to GET. A string `body` is sent verbatim and any
    /// other JSON value is sent serialized. `timeout` is a non-negative
    /// integer in milliseconds; anything else is rejected.
    pub fn from_json(options: &serde_json::Value) -> Result<Self, NetError> {
        let obj = options.as_object().ok_or(NetError::InvalidUrl)?;

        let url = obj
            .get("url")
            .and_then(|u| u.as_str())
            .ok_or(NetError::InvalidUrl)?;

        let method = match obj.get("method") {
            None | Some(serde_json::Value::Null) => "GET",
            Some(m) => m.as_str().ok_or(NetError::MethodNotSupported)?,
        };

        let mut request = Request::new(method, url);

        match obj.get("headers") {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::Object(headers)) => {
                for (name, value) in headers {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::Bool(b) => b.to_string(),
                        _ => return Err(NetError::InvalidHeader),
                    };
                    request.headers.push((name.clone(), value));
                }
            }
            Some(_) => return Err(NetError::InvalidHeader),
        }

        request.body = match obj.get("body") {
            None | Some(serde_json::Value::Null) => RequestBody::Empty,
            Some(serde_json::Value::String(s)) => RequestBody::from(s.as_str()),
            Some(other) => RequestBody::from(other.to_string()),
        };

        request.timeout = match obj.get("timeout") {
            None | Some(serde_json::Value::Null) => None,
            Some(t) => {
                let ms = t.as_u64().ok_or(NetError::InvalidArgument)?;
                Some(Duration::from_millis(ms))
            }
        };

        Ok(request)
    }

    /// Validate into a [`PreparedRequest`]. No network I/O happens here; an
    /// error from this step means the request is never attempted.
    pub fn prepare(&self) -> Result<PreparedRequest, NetError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(NetError::InvalidUrl);
        }

        let url = Url::parse(raw).map_err(|_| NetError::InvalidUrl)?;
        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(NetError::DisallowedUrlScheme),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(NetError::InvalidUrl);
        }

        let method = if self.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
                .map_err(|_| NetError::MethodNotSupported)?
        };

        let mut headers = OrderedHeaderMap::new();
        for (name, value) in &self.headers {
            headers.append(name, value)?;
        }

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body: self.body.clone(),
            timeout: self.timeout,
        })
    }
}

/// A validated request, ready to be attempted. Redirects produce new
/// prepared requests from the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: OrderedHeaderMap,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prepare_get() {
        let prepared = Request::get("https://example.com/path?q=1")
            .header("Accept", "text/html")
            .prepare()
            .unwrap();
        assert_eq!(prepared.method, Method::GET);
        assert_eq!(prepared.url.path(), "/path");
        assert_eq!(prepared.headers.get_str("accept"), Some("text/html"));
        assert!(prepared.body.is_empty());
    }

    #[test]
    fn test_prepare_rejects_bad_urls() {
        assert_eq!(Request::get("").prepare(), Err(NetError::InvalidUrl));
        assert_eq!(Request::get("   ").prepare(), Err(NetError::InvalidUrl));
        assert_eq!(Request::get("not a url").prepare(), Err(NetError::InvalidUrl));
        assert_eq!(
            Request::get("ftp://example.com/file").prepare(),
            Err(NetError::DisallowedUrlScheme)
        );
        assert_eq!(
            Request::get("file:///etc/passwd").prepare(),
            Err(NetError::DisallowedUrlScheme)
        );
    }

    #[test]
    fn test_prepare_rejects_bad_method() {
        let err = Request::new("GE T", "https://example.com").prepare();
        assert_eq!(err, Err(NetError::MethodNotSupported));
    }

    #[test]
    fn test_prepare_normalizes_method_case() {
        let prepared = Request::new("delete", "https://example.com").prepare().unwrap();
        assert_eq!(prepared.method, Method::DELETE);
    }

    #[test]
    fn test_prepare_rejects_bad_header() {
        let err = Request::get("https://example.com")
            .header("X-Bad", "line\r\nbreak")
            .prepare();
        assert_eq!(err, Err(NetError::InvalidHeader));
    }

    #[test]
    fn test_default_header_respects_caller() {
        let req = Request::get("https://example.com")
            .header("user-agent", "custom/2.0")
            .default_header("User-Agent", "Nexus/1.0");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers[0].1, "custom/2.0");
    }

    #[test]
    fn test_from_json() {
        let req = Request::from_json(&json!({
            "method": "PUT",
            "url": "https://api.example.com/items/1",
            "headers": {"X-Token": "abc", "X-Count": 3},
            "body": "{\"a\":1}",
            "timeout": 2500
        }))
        .unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.headers[0], ("X-Token".to_string(), "abc".to_string()));
        assert_eq!(req.headers[1].1, "3");
        assert_eq!(req.body.as_bytes(), b"{\"a\":1}");
        assert_eq!(req.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_from_json_serializes_object_body() {
        let req = Request::from_json(&json!({
            "url": "https://example.com",
            "body": {"name": "nexus"}
        }))
        .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.body.as_bytes(), br#"{"name":"nexus"}"#);
    }

    #[test]
    fn test_from_json_requires_url() {
        assert_eq!(
            Request::from_json(&json!({"method": "GET"})),
            Err(NetError::InvalidUrl)
        );
    }

    #[test]
    fn test_from_json_rejects_malformed_timeout() {
        for timeout in [json!("5000"), json!(2.5), json!(-1), json!(true), json!({})] {
            let err = Request::from_json(&json!({"url": "https://example.com", "timeout": timeout}))
                .unwrap_err();
            assert_eq!(err, NetError::InvalidArgument);
            assert!(err.is_invalid_request());
        }
        let req = Request::from_json(&json!({"url": "https://example.com", "timeout": null})).unwrap();
        assert_eq!(req.timeout, None);
    }
}
