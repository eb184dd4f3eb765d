//! Session-aware HTTP client.
//!
//! A [`SessionClient`] owns a cookie jar and a configuration. Every request
//! made through it shares the jar, so a `Set-Cookie` from one response is
//! sent back on the next matching request.
//!
//! # Example
//!
//! ```rust,no_run
//! use nexusnet::SessionClient;
//!
//! # async fn run() -> Result<(), nexusnet::NetError> {
//! let client = SessionClient::builder().max_retries(1).build();
//! let resp = client.get("https://example.com", &[]).await?;
//! println!("{} {}", resp.status(), resp.text());
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::config::SessionConfig;
use crate::cookies::jar::CookieJar;
use crate::http::request::Request;
use crate::http::requestbody::RequestBody;
use crate::http::response::HttpResponse;
use crate::http::streamfactory::HttpStreamFactory;
use crate::http::transaction::HttpNetworkTransaction;
use crate::http::transport::Transport;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::Duration;

static GLOBAL: LazyLock<SessionClient> = LazyLock::new(SessionClient::new);

/// HTTP client with a shared cookie jar.
///
/// Cloning is cheap and clones share jar, configuration and transport.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    cookie_jar: Arc<CookieJar>,
    config: RwLock<SessionConfig>,
}

impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("config", &self.config())
            .field("cookies", &self.inner.cookie_jar.len())
            .finish()
    }
}

impl SessionClient {
    /// Create a client with default settings and an empty jar.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The process-wide client, created on first use.
    pub fn global() -> &'static SessionClient {
        &GLOBAL
    }

    pub fn cookie_jar(&self) -> &Arc<CookieJar> {
        &self.inner.cookie_jar
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SessionConfig {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the configuration. Calls already in flight keep the
    /// configuration they started with.
    pub fn set_config(&self, config: SessionConfig) {
        self.update_config(|c| *c = config);
    }

    fn update_config(&self, f: impl FnOnce(&mut SessionConfig)) {
        let mut guard = self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Per-attempt timeout in milliseconds; `0` disables it.
    pub fn set_timeout(&self, ms: u64) {
        self.update_config(|c| c.timeout = Duration::from_millis(ms));
    }

    /// Retries after the first attempt.
    pub fn set_retries(&self, retries: usize) {
        self.update_config(|c| c.max_retries = retries);
    }

    /// Backoff unit in milliseconds.
    pub fn set_base_delay(&self, ms: u64) {
        self.update_config(|c| c.base_delay = Duration::from_millis(ms));
    }

    /// GET `url` with optional extra headers.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, NetError> {
        self.execute(Request::get(url).headers(headers.iter().copied()))
            .await
    }

    /// POST `body` to `url`. Sends `Content-Type: application/json` unless
    /// a content type is among `headers`.
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, NetError> {
        let request = Request::post(url, body)
            .headers(headers.iter().copied())
            .default_header("Content-Type", "application/json");
        self.execute(request).await
    }

    /// Perform a request described by an options object
    /// (`{ method, url, headers, body, timeout }`).
    pub async fn request(&self, options: &serde_json::Value) -> Result<HttpResponse, NetError> {
        self.execute(Request::from_json(options)?).await
    }

    /// Perform `request` under a snapshot of the current configuration.
    ///
    /// Validation errors return before any network attempt. Any HTTP status
    /// is a successful result.
    pub async fn execute(&self, request: Request) -> Result<HttpResponse, NetError> {
        let config = self.config();
        let prepared = request
            .default_header("User-Agent", &config.user_agent)
            .prepare()
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected request before sending");
                e
            })?;

        let method = prepared.method.clone();
        let url = prepared.url.clone();
        let mut transaction = HttpNetworkTransaction::new(
            self.inner.transport.clone(),
            self.inner.cookie_jar.clone(),
            config.transaction_settings(),
        );

        let result = transaction.start(prepared).await;
        match &result {
            Ok(resp) => tracing::debug!(
                %method,
                %url,
                status = resp.status().as_u16(),
                attempts = transaction.attempts(),
                "request complete"
            ),
            Err(e) => tracing::debug!(
                %method,
                %url,
                error = %e,
                attempts = transaction.attempts(),
                "request failed"
            ),
        }
        result
    }
}

/// Builder for a [`SessionClient`].
#[derive(Default)]
pub struct ClientBuilder {
    config: SessionConfig,
    cookie_jar: Option<Arc<CookieJar>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: usize) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_redirects(mut self, redirects: usize) -> Self {
        self.config.max_redirects = redirects;
        self
    }

    /// Share an existing jar, e.g. between two clients.
    pub fn cookie_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Replace the network layer. Defaults to [`HttpStreamFactory`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> SessionClient {
        SessionClient {
            inner: Arc::new(ClientInner {
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HttpStreamFactory::default())),
                cookie_jar: self.cookie_jar.unwrap_or_default(),
                config: RwLock::new(self.config),
            }),
        }
    }
}
