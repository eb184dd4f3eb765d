use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::http::request::PreparedRequest;
use crate::http::requestbody::RequestBody;
use crate::http::response::HttpResponse;
use crate::http::retry::{RetryPolicy, RetryReason};
use crate::http::transport::Transport;
use http::Method;
use std::sync::Arc;
use std::time::Duration;

/// Per-call settings, copied from the session configuration when the call
/// starts so that a concurrent reconfiguration cannot change it midway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSettings {
    pub retry: RetryPolicy,
    /// Per-attempt timeout. `Duration::ZERO` disables it.
    pub timeout: Duration,
    /// `0` disables redirect following: the 3xx response is returned.
    pub max_redirects: usize,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// Runs one logical request: cookies, retries, redirects.
///
/// Every attempt goes through the [`Transport`]; every hop's `Set-Cookie`
/// headers are merged into the jar before the next hop is built.
pub struct HttpNetworkTransaction {
    transport: Arc<dyn Transport>,
    cookie_jar: Arc<CookieJar>,
    settings: TransactionSettings,
    attempts: usize,
}

impl HttpNetworkTransaction {
    pub fn new(
        transport: Arc<dyn Transport>,
        cookie_jar: Arc<CookieJar>,
        settings: TransactionSettings,
    ) -> Self {
        Self {
            transport,
            cookie_jar,
            settings,
            attempts: 0,
        }
    }

    /// Transport attempts made so far, across all hops.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub async fn start(&mut self, request: PreparedRequest) -> Result<HttpResponse, NetError> {
        let mut current = request;
        let mut redirects = 0;

        loop {
            let response = self.send_with_retry(&current).await?;

            let stored = self
                .cookie_jar
                .store_response_cookies(&current.url, response.headers());
            if stored > 0 {
                tracing::trace!(url = %current.url, stored, "merged response cookies");
            }

            if self.settings.max_redirects == 0 {
                return Ok(response);
            }
            let Some(next) = redirect_request(&current, &response)? else {
                return Ok(response);
            };
            if redirects >= self.settings.max_redirects {
                tracing::debug!(url = %current.url, redirects, "redirect limit reached");
                return Err(NetError::TooManyRedirects);
            }
            redirects += 1;
            tracing::debug!(
                from = %current.url,
                to = %next.url,
                status = response.status().as_u16(),
                "following redirect"
            );
            current = next;
        }
    }

    async fn send_with_retry(&mut self, request: &PreparedRequest) -> Result<HttpResponse, NetError> {
        let timeout = request.timeout.unwrap_or(self.settings.timeout);
        let mut retries = 0;

        loop {
            // Cookies are read per attempt so a retry sees the latest jar.
            let outgoing = self.attach_cookies(request)?;
            self.attempts += 1;

            let result = if timeout.is_zero() {
                self.transport.send(outgoing).await
            } else {
                match tokio::time::timeout(timeout, self.transport.send(outgoing)).await {
                    Ok(result) => result,
                    Err(_) => Err(NetError::ConnectionTimedOut),
                }
            };

            let error = match result {
                Ok(response) => return Ok(response.with_url(request.url.clone())),
                Err(e) => e,
            };

            let Some(reason) = RetryReason::from_error(&error) else {
                return Err(error);
            };
            if !self.settings.retry.should_retry(retries) {
                tracing::warn!(
                    url = %request.url,
                    attempts = retries + 1,
                    error = %error,
                    "giving up after retries"
                );
                return Err(error);
            }

            retries += 1;
            let delay = self.settings.retry.delay_for(retries);
            tracing::debug!(
                url = %request.url,
                retry = retries,
                ?reason,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn attach_cookies(&self, request: &PreparedRequest) -> Result<PreparedRequest, NetError> {
        let mut outgoing = request.clone();
        if let Some(from_jar) = self.cookie_jar.cookie_header(&request.url) {
            let value = match request.headers.get_str("cookie") {
                Some(explicit) => format!("{explicit}; {from_jar}"),
                None => from_jar,
            };
            outgoing.headers.insert("cookie", &value)?;
        }
        Ok(outgoing)
    }
}

/// The next hop for a redirect response, or `None` if `response` is final.
///
/// 301, 302 and 303 turn anything but GET/HEAD into a body-less GET; 307
/// and 308 repeat the method and body. Credentials supplied by the caller
/// are not forwarded to a different host.
pub(crate) fn redirect_request(
    current: &PreparedRequest,
    response: &HttpResponse,
) -> Result<Option<PreparedRequest>, NetError> {
    let status = response.status().as_u16();
    if !matches!(status, 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    // A 3xx without Location is handed back as is.
    let Some(location) = response.header("location") else {
        return Ok(None);
    };

    let url = current
        .url
        .join(location)
        .map_err(|_| NetError::InvalidRedirect)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().map_or(true, str::is_empty) {
        return Err(NetError::InvalidRedirect);
    }

    let mut next = current.clone();

    let downgrade = matches!(status, 301 | 302 | 303)
        && current.method != Method::GET
        && current.method != Method::HEAD;
    if downgrade {
        next.method = Method::GET;
        next.body = RequestBody::Empty;
        next.headers.remove("content-type");
        next.headers.remove("content-length");
    }

    if url.host_str() != current.url.host_str() {
        next.headers.remove("authorization");
        next.headers.remove("cookie");
    }

    next.url = url;
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::orderedheaders::OrderedHeaderMap;
    use crate::http::request::Request;
    use bytes::Bytes;
    use http::StatusCode;
    use url::Url;

    fn redirect(status: u16, location: &str) -> HttpResponse {
        let mut headers = OrderedHeaderMap::new();
        headers.append("Location", location).unwrap();
        HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::new(),
            Url::parse("https://example.com/").unwrap(),
        )
    }

    fn post() -> PreparedRequest {
        Request::post("https://example.com/form", "a=1")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Authorization", "Bearer t")
            .prepare()
            .unwrap()
    }

    #[test]
    fn test_303_downgrades_to_get() {
        let next = redirect_request(&post(), &redirect(303, "/done")).unwrap().unwrap();
        assert_eq!(next.method, Method::GET);
        assert!(next.body.is_empty());
        assert!(!next.headers.contains("content-type"));
        assert_eq!(next.url.as_str(), "https://example.com/done");
    }

    #[test]
    fn test_307_keeps_method_and_body() {
        let next = redirect_request(&post(), &redirect(307, "/again")).unwrap().unwrap();
        assert_eq!(next.method, Method::POST);
        assert_eq!(next.body.as_bytes(), b"a=1");
        assert!(next.headers.contains("content-type"));
    }

    #[test]
    fn test_head_is_not_downgraded() {
        let head = Request::new("HEAD", "https://example.com/").prepare().unwrap();
        let next = redirect_request(&head, &redirect(302, "/x")).unwrap().unwrap();
        assert_eq!(next.method, Method::HEAD);
    }

    #[test]
    fn test_cross_host_strips_credentials() {
        let next = redirect_request(&post(), &redirect(307, "https://other.example.org/"))
            .unwrap()
            .unwrap();
        assert!(!next.headers.contains("authorization"));

        let same = redirect_request(&post(), &redirect(307, "/same")).unwrap().unwrap();
        assert!(same.headers.contains("authorization"));
    }

    #[test]
    fn test_invalid_redirect_target() {
        assert_eq!(
            redirect_request(&post(), &redirect(302, "ftp://example.com/file")),
            Err(NetError::InvalidRedirect)
        );
        assert_eq!(
            redirect_request(&post(), &redirect(302, "http://[::1")),
            Err(NetError::InvalidRedirect)
        );
    }

    #[test]
    fn test_non_redirect_status_is_final() {
        assert_eq!(redirect_request(&post(), &redirect(200, "/x")), Ok(None));
        assert_eq!(redirect_request(&post(), &redirect(304, "/x")), Ok(None));
    }
}
