use time::OffsetDateTime;
use url::Url;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    /// Lowercased, without a leading dot.
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
    /// Set when the cookie carried no `Domain` attribute: it is only sent
    /// back to the exact host that set it.
    pub host_only: bool,
}

/// Identity of a cookie inside a jar: (domain, path, name).
pub type CookieKey<'a> = (&'a str, &'a str, &'a str);

/// Why a `Set-Cookie` line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieRejection {
    /// Not a `name=value` pair.
    Malformed,
    EmptyName,
    /// Request URL has no host to scope the cookie to.
    NoHost,
    /// `Domain` attribute does not cover the request host.
    DomainMismatch,
    /// `Domain` attribute names a public suffix such as `com`.
    PublicSuffix,
}

impl CanonicalCookie {
    /// Session cookie scoped to `domain` and `path`, host-only.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into().trim_start_matches('.').to_ascii_lowercase(),
            path: if path.starts_with('/') { path } else { "/".to_string() },
            creation_time: OffsetDateTime::now_utc(),
            expiration_time: None,
            secure: false,
            http_only: false,
            host_only: true,
        }
    }

    pub fn with_expiry(mut self, expiry: OffsetDateTime) -> Self {
        self.expiration_time = Some(expiry);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_host_only(mut self, host_only: bool) -> Self {
        self.host_only = host_only;
        self
    }

    pub fn key(&self) -> CookieKey<'_> {
        (&self.domain, &self.path, &self.name)
    }

    /// Session cookies never expire on their own.
    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expiration_time
            .is_some_and(|expiry| expiry <= current_time)
    }

    /// RFC 6265 §5.1.3 domain matching against a request host.
    pub fn domain_matches(&self, request_host: &str) -> bool {
        if self.host_only {
            return self.domain.eq_ignore_ascii_case(request_host);
        }
        is_domain_match(request_host, &self.domain)
    }

    /// RFC 6265 §5.1.4 path matching against a request path.
    pub fn path_matches(&self, request_path: &str) -> bool {
        let cookie_path = self.path.as_str();
        if request_path == cookie_path {
            return true;
        }

        if let Some(rest) = request_path.strip_prefix(cookie_path) {
            return cookie_path.ends_with('/') || rest.starts_with('/');
        }

        false
    }

    /// Parse a single `Set-Cookie` header line received from `url`.
    ///
    /// `Max-Age` wins over `Expires`; a non-positive `Max-Age` yields a
    /// cookie that is already expired, which the jar treats as a deletion.
    /// Unknown attributes are ignored.
    pub fn parse(
        url: &Url,
        line: &str,
        now: OffsetDateTime,
    ) -> Result<CanonicalCookie, CookieRejection> {
        let parsed = cookie::Cookie::parse(line).map_err(|e| match e {
            cookie::ParseError::EmptyName => CookieRejection::EmptyName,
            _ => CookieRejection::Malformed,
        })?;
        if parsed.name().trim().is_empty() {
            return Err(CookieRejection::EmptyName);
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(CookieRejection::NoHost)?
            .to_ascii_lowercase();

        let (domain, host_only) = match parsed.domain().map(|d| d.trim_start_matches('.')) {
            Some(d) if !d.is_empty() => {
                let d = d.to_ascii_lowercase();
                if !is_domain_match(&host, &d) {
                    return Err(CookieRejection::DomainMismatch);
                }
                if crate::cookies::psl::is_public_suffix(&d) {
                    // A public suffix is only acceptable as the request host
                    // itself, and then only as a host-only cookie.
                    if d != host {
                        return Err(CookieRejection::PublicSuffix);
                    }
                    (host.clone(), true)
                } else {
                    (d, false)
                }
            }
            _ => (host.clone(), true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => "/".to_string(),
        };

        let expiration_time = match parsed.max_age() {
            Some(max_age) if max_age <= time::Duration::ZERO => Some(OffsetDateTime::UNIX_EPOCH),
            Some(max_age) => Some(now.saturating_add(max_age)),
            None => parsed.expires().and_then(|e| e.datetime()),
        };

        Ok(CanonicalCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            creation_time: now,
            expiration_time,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            host_only,
        })
    }
}

/// True when `host` equals `domain` or is a subdomain of it.
pub(crate) fn is_domain_match(host: &str, domain: &str) -> bool {
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    host.len() > domain.len()
        && host.is_char_boundary(host.len() - domain.len())
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}
