use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::http::orderedheaders::OrderedHeaderMap;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;
use url::Url;

/// Maximum cookies per domain (Chromium default).
const MAX_COOKIES_PER_DOMAIN: usize = 50;

/// Maximum cookies across all domains.
const MAX_COOKIES_TOTAL: usize = 3000;

type Store = HashMap<String, Vec<CanonicalCookie>>;

/// Session cookie store shared by every request of a client.
///
/// Cookies are indexed by domain. Each public operation runs under one
/// lock acquisition, so a concurrent reader never observes half of a
/// replace-or-delete. Expired cookies are purged lazily when read.
#[derive(Debug, Default)]
pub struct CookieJar {
    store: Mutex<Store>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock leaves the map structurally valid.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the cookie keyed by (domain, path, name).
    ///
    /// A cookie that is already expired deletes any stored cookie with the
    /// same key instead of being stored.
    pub fn set(&self, cookie: CanonicalCookie) {
        self.set_at(cookie, OffsetDateTime::now_utc());
    }

    fn set_at(&self, cookie: CanonicalCookie, now: OffsetDateTime) {
        let mut store = self.lock();
        let entry = store.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);

        if cookie.is_expired(now) {
            tracing::trace!(domain = %cookie.domain, name = %cookie.name, "cookie deleted");
            if entry.is_empty() {
                store.remove(&cookie.domain);
            }
            return;
        }

        // Per-domain limit evicts the oldest cookie first.
        while entry.len() >= MAX_COOKIES_PER_DOMAIN {
            match entry
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.creation_time)
                .map(|(i, _)| i)
            {
                Some(oldest) => {
                    entry.remove(oldest);
                }
                None => break,
            }
        }
        entry.push(cookie);

        Self::enforce_global_limit(&mut store);
    }

    fn enforce_global_limit(store: &mut Store) {
        while store.values().map(Vec::len).sum::<usize>() > MAX_COOKIES_TOTAL {
            let oldest = store
                .iter()
                .flat_map(|(domain, cookies)| {
                    cookies
                        .iter()
                        .enumerate()
                        .map(move |(idx, c)| (domain, idx, c.creation_time))
                })
                .min_by_key(|(_, _, created)| *created)
                .map(|(domain, idx, _)| (domain.clone(), idx));

            let Some((domain, idx)) = oldest else { break };
            if let Some(cookies) = store.get_mut(&domain) {
                cookies.remove(idx);
                if cookies.is_empty() {
                    store.remove(&domain);
                }
            }
        }
    }

    /// Non-expired cookies whose domain and path match the request.
    ///
    /// Ordered by longest path first, then earliest creation.
    pub fn get(&self, domain: &str, path: &str) -> Vec<CanonicalCookie> {
        self.get_at(domain, path, OffsetDateTime::now_utc())
    }

    /// Same as [`get`](Self::get), evaluating expiry as of `now`.
    pub fn get_at(&self, domain: &str, path: &str, now: OffsetDateTime) -> Vec<CanonicalCookie> {
        let host = domain.trim_end_matches('.').to_ascii_lowercase();
        let path = if path.is_empty() { "/" } else { path };
        let mut store = self.lock();
        let mut result = Vec::new();

        for candidate in candidate_domains(&host) {
            let Some(cookies) = store.get_mut(&candidate) else {
                continue;
            };
            cookies.retain(|c| !c.is_expired(now));
            result.extend(
                cookies
                    .iter()
                    .filter(|c| c.domain_matches(&host) && c.path_matches(path))
                    .cloned(),
            );
            if cookies.is_empty() {
                store.remove(&candidate);
            }
        }

        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.creation_time.cmp(&b.creation_time))
        });
        result
    }

    /// Cookies to send to `url`. `Secure` cookies are withheld from plain http.
    pub fn get_for_url(&self, url: &Url) -> Vec<CanonicalCookie> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let secure_channel = url.scheme() == "https";
        let mut cookies = self.get(host, url.path());
        cookies.retain(|c| secure_channel || !c.secure);
        cookies
    }

    /// `Cookie` request header value for `url`, or `None` if nothing applies.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_for_url(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Parse one `Set-Cookie` line received from `url` and store it.
    ///
    /// Malformed or disallowed lines are dropped. Returns whether the jar
    /// changed (a store or a deletion).
    pub fn parse_and_save_cookie(&self, url: &Url, cookie_line: &str) -> bool {
        let now = OffsetDateTime::now_utc();
        match CanonicalCookie::parse(url, cookie_line, now) {
            Ok(cookie) => {
                self.set_at(cookie, now);
                true
            }
            Err(reason) => {
                tracing::debug!(url = %url, ?reason, "dropping Set-Cookie");
                false
            }
        }
    }

    /// Merge every `Set-Cookie` header of a response, in order.
    pub fn store_response_cookies(&self, url: &Url, headers: &OrderedHeaderMap) -> usize {
        headers
            .get_all("set-cookie")
            .filter_map(|v| v.to_str().ok())
            .filter(|line| self.parse_and_save_cookie(url, line))
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of every stored cookie, expired ones included.
    pub fn all_cookies(&self) -> Vec<CanonicalCookie> {
        self.lock().values().flatten().cloned().collect()
    }

    /// Export to Netscape cookie file format (curl/wget compatible):
    /// `domain\tinclude_subdomains\tpath\tsecure\texpiry\tname\tvalue`.
    ///
    /// Session cookies are written with expiry `0`; HttpOnly cookies get
    /// curl's `#HttpOnly_` line prefix.
    pub fn export_netscape(&self) -> String {
        let mut cookies = self.all_cookies();
        cookies.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.name.cmp(&b.name)));

        let mut out = String::from("# Netscape HTTP Cookie File\n\n");
        for cookie in cookies {
            let domain = if cookie.host_only {
                cookie.domain.clone()
            } else {
                format!(".{}", cookie.domain)
            };
            let expiry = cookie
                .expiration_time
                .map(|t| t.unix_timestamp())
                .unwrap_or(0);
            if cookie.http_only {
                out.push_str("#HttpOnly_");
            }
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                domain,
                bool_field(!cookie.host_only),
                cookie.path,
                bool_field(cookie.secure),
                expiry,
                cookie.name,
                cookie.value
            ));
        }
        out
    }

    /// Import cookies from Netscape format content. Returns how many were
    /// stored; malformed and already-expired lines are skipped.
    pub fn import_netscape(&self, content: &str) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut count = 0;

        for line in content.lines() {
            // curl marks HttpOnly cookies with this prefix.
            let (line, http_only) = match line.strip_prefix("#HttpOnly_") {
                Some(rest) => (rest, true),
                None => (line, false),
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                tracing::debug!(line, "skipping malformed cookie line");
                continue;
            }

            let expiration_time = match fields[4].parse::<i64>() {
                Ok(0) => None,
                Ok(ts) => match OffsetDateTime::from_unix_timestamp(ts) {
                    Ok(t) => Some(t),
                    Err(_) => continue,
                },
                Err(_) => continue,
            };

            let mut cookie = CanonicalCookie::new(fields[5], fields[6], fields[0], fields[2])
                .with_host_only(!fields[1].eq_ignore_ascii_case("TRUE"))
                .with_secure(fields[3].eq_ignore_ascii_case("TRUE"))
                .with_http_only(http_only);
            cookie.creation_time = now;
            cookie.expiration_time = expiration_time;

            if cookie.name.is_empty() || cookie.domain.is_empty() || cookie.is_expired(now) {
                continue;
            }
            self.set_at(cookie, now);
            count += 1;
        }

        count
    }
}

fn bool_field(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// The host itself followed by each parent domain, most specific first.
fn candidate_domains(host: &str) -> impl Iterator<Item = String> + '_ {
    let first = std::iter::once(host.to_string());
    let parents = host
        .match_indices('.')
        .map(move |(i, _)| host[i + 1..].to_string())
        .filter(|d| !d.is_empty());
    first.chain(parents)
}
