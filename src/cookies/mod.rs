//! Session cookie storage.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`CookieJar`](jar::CookieJar) | Thread-safe jar keyed by (domain, path, name) |
//! | [`CanonicalCookie`](canonicalcookie::CanonicalCookie) | One cookie plus `Set-Cookie` parsing |
//! | [`psl`] | Public suffix checks for `Domain` attributes |
//!
//! Matching follows RFC 6265: host-only cookies go back to their exact host,
//! domain cookies to the domain and its subdomains, and `Secure` cookies
//! only over https.
//!
//! ```rust
//! use nexusnet::cookies::jar::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let url = Url::parse("https://example.com/login").unwrap();
//! jar.parse_and_save_cookie(&url, "session=abc123; Path=/; HttpOnly");
//! assert_eq!(jar.cookie_header(&url).as_deref(), Some("session=abc123"));
//! ```

pub mod canonicalcookie;
pub mod jar;
pub mod psl;

pub use canonicalcookie::CanonicalCookie;
pub use jar::CookieJar;
