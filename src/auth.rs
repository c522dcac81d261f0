//! Credential supply for servers that issue authentication challenges.
//!
//! Only Basic challenges are answered. A request that already carries an
//! `Authorization` header is never replayed.

use std::fmt;

use reqwest::header::WWW_AUTHENTICATE;
use url::Url;

use crate::request::{basic_auth_value, Request};
use crate::response::Response;

/// A username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// The `Authorization` header value for these credentials.
    pub fn basic_header(&self) -> String {
        basic_auth_value(&self.username, &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A Basic authentication challenge received from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// The URL that was challenged.
    pub url: Url,
    /// The realm advertised by the server, if any.
    pub realm: Option<String>,
}

impl Challenge {
    /// Parse a `WWW-Authenticate` value, accepting only the Basic scheme.
    ///
    /// A single value may carry several challenges
    /// (`Bearer realm="api", Basic realm="site"`); the first Basic one wins.
    pub fn parse_basic(url: &Url, header: &str) -> Option<Self> {
        let mut in_basic = false;
        let mut found = false;
        let mut realm = None;

        for segment in header.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (first, rest) = segment
                .split_once(char::is_whitespace)
                .unwrap_or((segment, ""));

            // A segment whose first token is not `key=value` opens a new challenge.
            let params = if first.contains('=') {
                segment
            } else {
                if found {
                    break;
                }
                in_basic = first.eq_ignore_ascii_case("basic");
                found = in_basic;
                rest
            };

            if in_basic && realm.is_none() {
                realm = realm_param(params);
            }
        }

        found.then(|| Self {
            url: url.clone(),
            realm,
        })
    }
}

fn realm_param(param: &str) -> Option<String> {
    let (key, value) = param.trim().split_once('=')?;
    key.trim()
        .eq_ignore_ascii_case("realm")
        .then(|| value.trim().trim_matches('"').to_string())
}

/// Supplies credentials when a server challenges for them.
pub trait Authenticator: Send + Sync {
    /// Return credentials for the challenge, or `None` to give up.
    fn credentials(&self, challenge: &Challenge) -> Option<Credentials>;
}

/// Answers every challenge with the same credentials.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    credentials: Credentials,
}

impl StaticAuthenticator {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            credentials: Credentials::new(username, password),
        }
    }
}

impl Authenticator for StaticAuthenticator {
    fn credentials(&self, challenge: &Challenge) -> Option<Credentials> {
        tracing::debug!(url = %challenge.url, realm = ?challenge.realm, "answering basic challenge");
        Some(self.credentials.clone())
    }
}

/// Decide whether a response should be replayed with credentials.
pub(crate) fn answer_challenge(
    authenticator: Option<&dyn Authenticator>,
    request: &Request,
    response: &Response,
) -> Option<Credentials> {
    let authenticator = authenticator?;
    if response.status() != 401 || request.has_authorization() {
        return None;
    }

    let challenge = response
        .header_values(WWW_AUTHENTICATE.as_str())
        .into_iter()
        .find_map(|value| Challenge::parse_basic(request.url(), value))?;

    authenticator.credentials(&challenge)
}
