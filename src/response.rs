//! Fully received HTTP responses.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use url::Url;

use crate::error::{Error, Result};

/// A completed HTTP response with its body read into memory.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Assemble a response from its parts.
    pub fn new(status: u16, url: Url, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url,
            headers,
            body: body.into(),
        }
    }

    /// Read an async reqwest response to completion.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::from_transport)?;
        Ok(Self::new(status, url, headers, body))
    }

    /// Read a blocking reqwest response to completion.
    pub(crate) fn read_blocking(response: reqwest::blocking::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(Error::from_transport)?;
        Ok(Self::new(status, url, headers, body))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The final URL (after redirects).
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header, in the order received.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Consume the response, returning the body as text.
    pub fn into_text(self) -> String {
        match String::from_utf8(self.body.to_vec()) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
