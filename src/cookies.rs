//! Cookie supply and storage per URL.
//!
//! A [`CookieHandler`] is installed into the underlying reqwest client
//! through [`CookieBridge`], which implements reqwest's `CookieStore`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::header::HeaderValue;
use url::Url;

/// Supplies cookies for outgoing requests and stores cookies set by responses.
pub trait CookieHandler: Send + Sync {
    /// Cookies to send to `url`, as `(name, value)` pairs.
    fn cookies(&self, url: &Url) -> Vec<(String, String)>;

    /// Store the raw `Set-Cookie` values a response from `url` carried.
    fn store(&self, url: &Url, set_cookies: &[String]);
}

/// Sends a fixed set of cookies to every URL and ignores `Set-Cookie`.
#[derive(Debug, Clone, Default)]
pub struct StaticCookies {
    cookies: Vec<(String, String)>,
}

impl StaticCookies {
    pub fn new<I, N, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl CookieHandler for StaticCookies {
    fn cookies(&self, url: &Url) -> Vec<(String, String)> {
        tracing::trace!(%url, count = self.cookies.len(), "supplying static cookies");
        self.cookies.clone()
    }

    fn store(&self, _url: &Url, _set_cookies: &[String]) {}
}

/// In-memory cookie store keyed by host.
///
/// Attributes (`Path`, `Expires`, ...) are ignored; a later cookie with the
/// same name replaces the earlier one.
#[derive(Debug, Default)]
pub struct CookieJar {
    hosts: Mutex<HashMap<String, BTreeMap<String, String>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie for a host directly.
    pub fn insert(&self, host: &str, name: &str, value: &str) {
        self.lock()
            .entry(host.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    // Every write is a single map insert, so a panic elsewhere cannot leave
    // the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, BTreeMap<String, String>>> {
        self.hosts.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("cookie jar lock was poisoned; continuing with its contents");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl CookieHandler for CookieJar {
    fn cookies(&self, url: &Url) -> Vec<(String, String)> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        self.lock()
            .get(host)
            .map(|jar| {
                jar.iter()
                    .map(|(n, v)| (n.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn store(&self, url: &Url, set_cookies: &[String]) {
        let Some(host) = url.host_str() else {
            return;
        };
        for raw in set_cookies {
            match parse_set_cookie(raw) {
                Some((name, value)) => self.insert(host, name, value),
                None => tracing::warn!(%url, cookie = %raw, "ignoring malformed Set-Cookie"),
            }
        }
    }
}

/// Extract the leading `name=value` pair of a `Set-Cookie` value.
fn parse_set_cookie(raw: &str) -> Option<(&str, &str)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Adapts a [`CookieHandler`] to reqwest's cookie store interface.
#[derive(Clone)]
pub struct CookieBridge {
    handler: Arc<dyn CookieHandler>,
}

impl CookieBridge {
    pub fn new(handler: Arc<dyn CookieHandler>) -> Self {
        Self { handler }
    }

    /// Render the `Cookie` header value for a URL.
    fn header_for(&self, url: &Url) -> Option<String> {
        let cookies = self.handler.cookies(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl std::fmt::Debug for CookieBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieBridge").finish_non_exhaustive()
    }
}

impl reqwest::cookie::CookieStore for CookieBridge {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let raw: Vec<String> = cookie_headers
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        if !raw.is_empty() {
            self.handler.store(url, &raw);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self.header_for(url)?;
        match HeaderValue::from_str(&header) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%url, "cookie handler produced an invalid Cookie header");
                None
            }
        }
    }
}
