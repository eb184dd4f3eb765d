//! # nexusnet
//!
//! Networking and HTML primitives for the Nexus scripting host.
//!
//! - A session-aware HTTP client: one cookie jar shared by every request,
//!   bounded retries with linear backoff, per-attempt timeouts and redirect
//!   following.
//! - A tolerant HTML parser that turns whatever a server returns into a
//!   tree, and a CSS selector engine to query it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nexusnet::{Document, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SessionClient::new();
//!     let resp = client.get("https://example.com", &[]).await?;
//!     let doc = Document::parse(&resp.text());
//!     for link in doc.select("a[href^='https']")? {
//!         println!("{}", link.attr("href").unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Synchronous callers use [`blocking::Session`], which owns its own
//! runtime.
//!
//! ## Modules
//!
//! - [`base`] - Error codes and classification
//! - [`client`] - Async session client and builder
//! - [`blocking`] - Blocking facade over the client
//! - [`config`] - Session configuration
//! - [`cookies`] - Cookie jar and `Set-Cookie` parsing
//! - [`http`] - Requests, responses, retry policy and the transport seam
//! - [`socket`] - DNS, TCP and TLS connection setup
//! - [`dom`] - HTML parsing and selectors

pub mod base;
pub mod blocking;
pub mod client;
pub mod config;
pub mod cookies;
pub mod dom;
pub mod http;
pub mod socket;

pub use base::neterror::{ErrorKind, NetError};
pub use client::{ClientBuilder, SessionClient};
pub use config::SessionConfig;
pub use cookies::{CanonicalCookie, CookieJar};
pub use dom::{Document, NodeHandle, Selector, SelectorSyntaxError};
pub use http::{HttpResponse, Request, RequestBody};
