//! Immutable HTTP requests and their builder.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// An HTTP request.
///
/// Requests are immutable once built and cheap to clone (the body is
/// reference counted), so the same request can be replayed, e.g. after an
/// authentication challenge.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wireprobe::Request;
///
/// # fn example() -> wireprobe::Result<()> {
/// let request = Request::get("http://localhost:8080/test?queryParam=value")
///     .header("header", "header_value")
///     .timeout(Duration::from_millis(500))
///     .build()?;
/// assert_eq!(request.method(), "GET");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl Request {
    /// Start building a request with an arbitrary method.
    pub fn builder(method: &str, url: &str) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Start building a GET request.
    pub fn get(url: &str) -> RequestBuilder {
        RequestBuilder::new("GET", url)
    }

    /// Start building a POST request.
    pub fn post(url: &str) -> RequestBuilder {
        RequestBuilder::new("POST", url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns true if the caller already attached credentials.
    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

/// Builder for [`Request`].
///
/// Errors (bad URL, header, method) are collected and reported by
/// [`RequestBuilder::build`], so calls can be chained freely.
#[derive(Debug)]
pub struct RequestBuilder {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    timeout: Option<Duration>,
    error: Option<Error>,
}

impl RequestBuilder {
    fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    /// Append a header. Repeated names are kept as separate values.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set `Authorization: Basic ...` directly.
    ///
    /// Some servers never send a `WWW-Authenticate` challenge, so an
    /// [`Authenticator`](crate::Authenticator) is never consulted for them.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let value = basic_auth_value(username, password);
        self.header(AUTHORIZATION.as_str(), &value)
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.header(CONTENT_TYPE.as_str(), "application/json")
            }
            Err(e) => {
                self.error.get_or_insert(Error::Serialize(e));
                self
            }
        }
    }

    /// Set the per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, method, or any header is invalid.
    pub fn build(self) -> Result<Request> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidRequest(format!("invalid method '{}'", self.method)))?;
        let url = Url::parse(&self.url)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidRequest(format!("invalid header name '{name}'")))?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                Error::InvalidRequest(format!("invalid value for header '{name}'"))
            })?;
            headers.append(name, value);
        }

        Ok(Request {
            method,
            url,
            headers,
            body: self.body,
            timeout: self.timeout,
        })
    }
}

/// Encode `username:password` as a Basic `Authorization` header value.
pub fn basic_auth_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
