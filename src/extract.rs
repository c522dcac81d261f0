//! Extraction steps that turn a response into a value or a failure.
//!
//! The clients never treat a status code as an error; these helpers are
//! where a caller opts into that policy.

use crate::error::{Error, Result};
use crate::response::Response;

/// The body as text if the status is exactly 200.
///
/// # Errors
///
/// Returns [`Error::Application`] for any other status.
pub fn body_if_ok(response: Response) -> Result<String> {
    if response.status() != 200 {
        return Err(unexpected_status(&response));
    }
    Ok(response.into_text())
}

/// The body as text if the status is 2xx.
///
/// # Errors
///
/// Returns [`Error::Application`] for non-2xx statuses.
pub fn body_if_success(response: Response) -> Result<String> {
    if !response.is_success() {
        return Err(unexpected_status(&response));
    }
    Ok(response.into_text())
}

fn unexpected_status(response: &Response) -> Error {
    Error::Application {
        status: response.status(),
        message: format!("unexpected status from {}", response.url()),
    }
}
