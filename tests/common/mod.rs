//! Shared fixtures: stub rules, matchers, and client setup.
//!
//! Each `stub_*` function mounts the rules one scenario needs on a
//! wiremock server.

#![allow(dead_code)]

use std::time::Duration;

use regex::Regex;
use tokio::runtime::Runtime;
use wiremock::matchers::{basic_auth, body_string, method, path, query_param};
use wiremock::{Match, Mock, MockServer, ResponseTemplate};
use wireprobe::{ClientBuilder, Request, StaticAuthenticator, StaticCookies};

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

/// Deadline used by the simple, post, and auth requests.
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);

/// Delay of the long-running stub; longer than [`SHORT_TIMEOUT`].
pub const LONG_OPERATION: Duration = Duration::from_millis(1000);

/// Delay that makes `/b` lose every race in the cascade.
pub const CASCADE_DELAY: Duration = Duration::from_millis(2000);

// =============================================================================
// Matchers
// =============================================================================

/// Matches when any value of a header contains a substring.
pub struct HeaderContains {
    name: String,
    needle: String,
}

impl HeaderContains {
    pub fn new(name: &str, needle: &str) -> Self {
        Self {
            name: name.to_string(),
            needle: needle.to_string(),
        }
    }
}

impl Match for HeaderContains {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request
            .headers
            .get_all(self.name.as_str())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains(&self.needle))
    }
}

/// Matches when a named cookie's value fully matches a pattern.
pub struct CookieMatches {
    name: String,
    pattern: Regex,
}

impl CookieMatches {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: Regex::new(&format!("^(?:{pattern})$")).expect("valid cookie pattern"),
        }
    }
}

impl Match for CookieMatches {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request
            .headers
            .get_all("cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == self.name && self.pattern.is_match(value))
    }
}

// =============================================================================
// Stub rules
// =============================================================================

pub async fn stub_ok_response(server: &MockServer) {
    // `path` ignores the query string, so the query param is matched separately.
    Mock::given(method("GET"))
        .and(path("/test"))
        .and(HeaderContains::new("header", "value"))
        .and(CookieMatches::new("cookie", ".*12345.*"))
        .and(query_param("queryParam", "value"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Hahaha")
                .insert_header("header", "return"),
        )
        .mount(server)
        .await;
}

pub async fn stub_post(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/test"))
        .and(body_string("body"))
        .and(HeaderContains::new("header", "post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .insert_header("header", "ok"),
        )
        .mount(server)
        .await;
}

/// `/auth` answers 200 only with the right Basic credentials. Anything else
/// falls through to a 404; the server never challenges.
pub async fn stub_auth(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(basic_auth(USERNAME, PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hahaha"))
        .mount(server)
        .await;
}

/// Like [`stub_auth`], but requests without valid credentials get a Basic
/// challenge.
pub async fn stub_auth_with_challenge(server: &MockServer) {
    stub_auth_challenged_by(server, r#"Basic realm="wireprobe""#).await;
}

/// `/auth` answers 401 with the given `WWW-Authenticate` value until the
/// right Basic credentials arrive.
pub async fn stub_auth_challenged_by(server: &MockServer, challenge: &str) {
    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(basic_auth(USERNAME, PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hahaha"))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("www-authenticate", challenge),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

/// `/moved` redirects to `/target`.
pub async fn stub_redirect(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/target"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(ResponseTemplate::new(200).set_body_string("followed"))
        .mount(server)
        .await;
}

pub async fn stub_error_response(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

pub async fn stub_long_operation(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_delay(LONG_OPERATION))
        .mount(server)
        .await;
}

/// `/a` → "Hello", `/b` → "World" after [`CASCADE_DELAY`], `/c` → "WireMock".
pub async fn stub_cascade(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("World")
                .set_delay(CASCADE_DELAY),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string("WireMock"))
        .mount(server)
        .await;
}

// =============================================================================
// Clients and requests
// =============================================================================

/// Client configuration shared by every scenario: a fixed authenticator and
/// a cookie handler that always sends `cookie=0123456`.
pub fn client_builder() -> ClientBuilder {
    ClientBuilder::new()
        .authenticator(StaticAuthenticator::new(USERNAME, PASSWORD))
        .cookie_handler(StaticCookies::new([("cookie", "0123456")]))
}

pub fn test_uri(server: &MockServer) -> String {
    format!("{}/test?queryParam=value", server.uri())
}

pub fn simple_request(server: &MockServer) -> Request {
    Request::get(&test_uri(server))
        .header("header", "header_value")
        .timeout(SHORT_TIMEOUT)
        .build()
        .expect("valid simple request")
}

pub fn post_request(server: &MockServer) -> Request {
    Request::post(&test_uri(server))
        .header("header", "post")
        .timeout(SHORT_TIMEOUT)
        .body("body")
        .build()
        .expect("valid post request")
}

pub fn auth_request(server: &MockServer) -> Request {
    Request::get(&format!("{}/auth", server.uri()))
        .basic_auth(USERNAME, PASSWORD)
        .timeout(SHORT_TIMEOUT)
        .build()
        .expect("valid auth request")
}

pub fn cascade_request(server: &MockServer, name: &str) -> Request {
    Request::get(&format!("{}/{name}", server.uri()))
        .build()
        .expect("valid cascade request")
}

// =============================================================================
// Blocking harness
// =============================================================================

/// A mock server driven from synchronous tests.
///
/// The blocking client must not run inside an async context, so the
/// wiremock API is driven through a private runtime instead.
pub struct SyncHarness {
    // Dropped before the runtime.
    pub server: MockServer,
    runtime: Runtime,
}

impl SyncHarness {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn block_on<Fut: std::future::Future>(&self, future: Fut) -> Fut::Output {
        self.runtime.block_on(future)
    }
}
