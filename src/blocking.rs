//! Blocking facade for synchronous hosts such as a script interpreter.
//!
//! Each [`Session`] owns a current-thread tokio runtime and drives the
//! async [`SessionClient`] on it. Calls block the calling thread until the
//! response, or the final error, is available. Must not be used from
//! inside an async context.

use crate::base::neterror::NetError;
use crate::client::SessionClient;
use crate::config::SessionConfig;
use crate::cookies::jar::CookieJar;
use crate::http::request::Request;
use crate::http::requestbody::RequestBody;
use crate::http::response::HttpResponse;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

pub struct Session {
    client: SessionClient,
    runtime: Runtime,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("client", &self.client).finish()
    }
}

impl Session {
    /// A session with its own client and jar.
    pub fn new() -> std::io::Result<Self> {
        Self::with_client(SessionClient::new())
    }

    /// A session over the process-wide client, sharing its jar.
    pub fn global() -> std::io::Result<Self> {
        Self::with_client(SessionClient::global().clone())
    }

    pub fn with_client(client: SessionClient) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { client, runtime })
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn cookie_jar(&self) -> &Arc<CookieJar> {
        self.client.cookie_jar()
    }

    pub fn config(&self) -> SessionConfig {
        self.client.config()
    }

    pub fn set_timeout(&self, ms: u64) {
        self.client.set_timeout(ms);
    }

    pub fn set_retries(&self, retries: usize) {
        self.client.set_retries(retries);
    }

    pub fn set_base_delay(&self, ms: u64) {
        self.client.set_base_delay(ms);
    }

    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, NetError> {
        self.runtime.block_on(self.client.get(url, headers))
    }

    pub fn post(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, NetError> {
        self.runtime.block_on(self.client.post(url, body, headers))
    }

    pub fn request(&self, options: &serde_json::Value) -> Result<HttpResponse, NetError> {
        self.runtime.block_on(self.client.request(options))
    }

    pub fn execute(&self, request: Request) -> Result<HttpResponse, NetError> {
        self.runtime.block_on(self.client.execute(request))
    }
}
