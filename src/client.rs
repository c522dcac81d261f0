//! HTTP clients.
//!
//! [`HttpClient`] is the async client; [`BlockingClient`] wraps reqwest's
//! blocking client with the same configuration. Both are built once by a
//! [`ClientBuilder`] and reused, since each owns a connection pool.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::redirect;

use crate::auth::{answer_challenge, Authenticator, Credentials, StaticAuthenticator};
use crate::cookies::{CookieBridge, CookieHandler};
use crate::error::{Error, Result};
use crate::pending::PendingResponse;
use crate::request::Request;
use crate::response::Response;
use crate::traits::{dispatch_pending, Dispatch};

const USER_AGENT: &str = concat!("wireprobe/", env!("CARGO_PKG_VERSION"));

/// Configuration shared by the async and blocking clients.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use wireprobe::{ClientBuilder, StaticAuthenticator, StaticCookies};
///
/// # fn example() -> wireprobe::Result<()> {
/// let client = ClientBuilder::new()
///     .authenticator(StaticAuthenticator::new("username", "password"))
///     .cookie_handler(StaticCookies::new([("cookie", "0123456")]))
///     .connect_timeout(Duration::from_millis(500))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ClientBuilder {
    authenticator: Option<Arc<dyn Authenticator>>,
    cookie_handler: Option<Arc<dyn CookieHandler>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    follow_redirects: bool,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("authenticator", &self.authenticator.is_some())
            .field("cookie_handler", &self.cookie_handler.is_some())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("follow_redirects", &self.follow_redirects)
            .finish()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from environment variables.
    ///
    /// - `WIREPROBE_TIMEOUT_MS` - default request timeout
    /// - `WIREPROBE_CONNECT_TIMEOUT_MS` - connect timeout
    /// - `WIREPROBE_USER_AGENT` - user agent override
    /// - `WIREPROBE_USERNAME` / `WIREPROBE_PASSWORD` - credentials used to
    ///   answer Basic challenges
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is not a number, or only one of the
    /// credential variables is set.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new();

        if let Some(ms) = env_millis("WIREPROBE_TIMEOUT_MS")? {
            builder = builder.timeout(ms);
        }
        if let Some(ms) = env_millis("WIREPROBE_CONNECT_TIMEOUT_MS")? {
            builder = builder.connect_timeout(ms);
        }
        if let Ok(agent) = env::var("WIREPROBE_USER_AGENT") {
            builder = builder.user_agent(&agent);
        }

        match (env::var("WIREPROBE_USERNAME"), env::var("WIREPROBE_PASSWORD")) {
            (Ok(user), Ok(password)) => {
                builder = builder.authenticator(StaticAuthenticator::new(&user, &password));
            }
            (Err(_), Err(_)) => {}
            _ => {
                return Err(Error::Config(
                    "WIREPROBE_USERNAME and WIREPROBE_PASSWORD must be set together".to_string(),
                ))
            }
        }

        Ok(builder)
    }

    /// Answer Basic challenges with this authenticator.
    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Supply and store cookies through this handler.
    pub fn cookie_handler(mut self, handler: impl CookieHandler + 'static) -> Self {
        self.cookie_handler = Some(Arc::new(handler));
        self
    }

    /// Share an existing cookie handler (e.g. a [`CookieJar`](crate::CookieJar)
    /// the caller wants to inspect).
    pub fn shared_cookie_handler(mut self, handler: Arc<dyn CookieHandler>) -> Self {
        self.cookie_handler = Some(handler);
        self
    }

    /// Default timeout for requests that do not set their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = Some(agent.to_string());
        self
    }

    /// Follow `3xx` responses instead of returning them.
    ///
    /// Off by default: a redirect reaches the caller as an ordinary response,
    /// and extraction decides whether it counts as a failure.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    fn redirect_policy(&self) -> redirect::Policy {
        if self.follow_redirects {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        }
    }

    /// Build the async client.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest cannot initialize its client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .redirect(self.redirect_policy())
            .brotli(true)
            .gzip(true)
            .deflate(true);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(handler) = &self.cookie_handler {
            builder = builder.cookie_provider(Arc::new(CookieBridge::new(handler.clone())));
        }

        let http = builder.build().map_err(Error::Transport)?;

        Ok(HttpClient {
            http,
            authenticator: self.authenticator,
        })
    }

    /// Build the blocking client.
    ///
    /// Must not be called from inside an async context; reqwest's blocking
    /// client runs its own runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest cannot initialize its client.
    pub fn build_blocking(self) -> Result<BlockingClient> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .redirect(self.redirect_policy())
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(self.timeout);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(handler) = &self.cookie_handler {
            builder = builder.cookie_provider(Arc::new(CookieBridge::new(handler.clone())));
        }

        let http = builder.build().map_err(Error::Transport)?;

        Ok(BlockingClient {
            http,
            authenticator: self.authenticator,
        })
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| Error::Config(format!("{name} must be a number of milliseconds, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Async HTTP client.
///
/// This struct is cheaply cloneable; clones share the same connection pool,
/// authenticator, and cookie handler.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("authenticator", &self.authenticator.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// A client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if reqwest cannot initialize its client.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Send a request and read the whole response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn send(&self, request: &Request) -> Result<Response> {
        let response = self.execute(request, None).await?;

        if let Some(credentials) =
            answer_challenge(self.authenticator.as_deref(), request, &response)
        {
            tracing::debug!("replaying request with credentials after challenge");
            return self.execute(request, Some(&credentials)).await;
        }

        tracing::debug!(status = response.status(), "response received");
        Ok(response)
    }

    /// Start a request and return immediately.
    ///
    /// The request runs as a task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_async(&self, request: Request) -> PendingResponse<Response> {
        dispatch_pending(self, request)
    }

    async fn execute(
        &self,
        request: &Request,
        credentials: Option<&Credentials>,
    ) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(credentials) = credentials {
            builder = builder.header(AUTHORIZATION, credentials.basic_header());
        }

        let response = builder.send().await.map_err(Error::from_transport)?;
        Response::read(response).await
    }
}

#[async_trait]
impl Dispatch for HttpClient {
    async fn dispatch(&self, request: Request) -> Result<Response> {
        self.send(&request).await
    }
}

/// Blocking HTTP client.
///
/// Each call parks the calling thread until the response is read or the
/// timeout elapses.
#[derive(Clone)]
pub struct BlockingClient {
    http: reqwest::blocking::Client,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("authenticator", &self.authenticator.is_some())
            .finish_non_exhaustive()
    }
}

impl BlockingClient {
    /// Send a request and read the whole response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deadline passes and
    /// [`Error::Transport`] on connection failures.
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub fn send(&self, request: &Request) -> Result<Response> {
        let response = self.execute(request, None)?;

        if let Some(credentials) =
            answer_challenge(self.authenticator.as_deref(), request, &response)
        {
            tracing::debug!("replaying request with credentials after challenge");
            return self.execute(request, Some(&credentials));
        }

        tracing::debug!(status = response.status(), "response received");
        Ok(response)
    }

    fn execute(&self, request: &Request, credentials: Option<&Credentials>) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(credentials) = credentials {
            builder = builder.header(AUTHORIZATION, credentials.basic_header());
        }

        let response = builder.send().map_err(Error::from_transport)?;
        Response::read_blocking(response)
    }
}
