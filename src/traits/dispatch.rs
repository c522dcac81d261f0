//! Dispatch trait for sending requests.

use async_trait::async_trait;

use crate::error::Result;
use crate::pending::PendingResponse;
use crate::request::Request;
use crate::response::Response;

/// Send a request and produce its response.
///
/// # Example
///
/// ```ignore
/// use wireprobe::{Dispatch, HttpClient, Request};
///
/// let client = HttpClient::new()?;
/// let response = client.dispatch(Request::get("http://localhost/").build()?).await?;
/// ```
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Send the request and wait for the complete response.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or transport failure. Non-2xx statuses
    /// are responses, not errors.
    async fn dispatch(&self, request: Request) -> Result<Response>;
}

/// Start a request on a cloned dispatcher and return its pending handle.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn dispatch_pending<D>(dispatcher: &D, request: Request) -> PendingResponse<Response>
where
    D: Dispatch + Clone + 'static,
{
    let dispatcher = dispatcher.clone();
    PendingResponse::spawn(async move { dispatcher.dispatch(request).await })
}
