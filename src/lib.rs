//! HTTP client with composable pending responses.
//!
//! A small library for sending HTTP requests synchronously or
//! asynchronously and composing several in-flight responses into one
//! value, with the failure policy (timeouts, transport errors, unexpected
//! statuses) left to the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use wireprobe::{combine_all, extract, HttpClient, Request};
//!
//! #[tokio::main]
//! async fn main() -> wireprobe::Result<()> {
//!     // Build the client once; it owns the connection pool.
//!     let client = HttpClient::builder()
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     // Fire three requests without waiting.
//!     let mut pending = Vec::new();
//!     for path in ["a", "b", "c"] {
//!         let request = Request::get(&format!("http://localhost:8080/{path}")).build()?;
//!         pending.push(client.send_async(request).and_then(extract::body_if_ok));
//!     }
//!
//!     // Join bodies in request order, whatever order they arrive in.
//!     let joined = combine_all(pending, |a, b| a + &b).await?;
//!     println!("{joined}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Request`] / [`Response`] - immutable request and fully read response
//! - [`HttpClient`] / [`BlockingClient`] - async and blocking dispatch,
//!   built once by [`ClientBuilder`]
//! - [`PendingResponse`] - resolve-once handle with `map`, `and_then`,
//!   `recover`, `combine`, and `either`
//! - [`combine_all`] / [`race_then_combine`] - n-ary composition
//! - [`Authenticator`] / [`CookieHandler`] - hooks fixed at construction
//!
//! # Configuration
//!
//! [`ClientBuilder::from_env`] reads:
//!
//! - `WIREPROBE_TIMEOUT_MS` (optional) - default request timeout
//! - `WIREPROBE_CONNECT_TIMEOUT_MS` (optional) - connect timeout
//! - `WIREPROBE_USER_AGENT` (optional) - user agent override
//! - `WIREPROBE_USERNAME` / `WIREPROBE_PASSWORD` (optional) - credentials
//!   for Basic challenges

mod auth;
mod client;
mod compose;
mod cookies;
mod error;
mod output;
mod pending;
mod request;
mod response;
mod traits;

pub mod cli;
pub mod extract;

// Re-export core types
pub use client::{BlockingClient, ClientBuilder, HttpClient};
pub use error::{Error, Result};
pub use pending::PendingResponse;
pub use request::{basic_auth_value, Request, RequestBuilder};
pub use response::Response;

// Re-export composition
pub use compose::{combine_all, race_then_combine};
pub use traits::{dispatch_pending, Dispatch};

// Re-export hooks
pub use auth::{Authenticator, Challenge, Credentials, StaticAuthenticator};
pub use cookies::{CookieBridge, CookieHandler, CookieJar, StaticCookies};

// Re-export output helpers
pub use output::{HeaderRow, PrettyPrint, ResponseView};
