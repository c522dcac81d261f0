//! Error types for request dispatch and response composition.

use thiserror::Error;

/// Errors that can occur while building, sending, or composing requests.
#[derive(Debug, Error)]
pub enum Error {
    /// The request exceeded its deadline.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection-level failure (DNS, refused connection, broken body, ...).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Failure raised by caller logic, e.g. an unexpected status code.
    #[error("application error (status {status}): {message}")]
    Application { status: u16, message: String },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON body encoding error.
    #[error("Failed to serialize body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A pending task panicked or was aborted before it resolved.
    #[error("pending response task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// An n-ary combine was given no inputs.
    #[error("nothing to combine")]
    NothingToCombine,
}

impl Error {
    /// Classify a reqwest error as a timeout or a transport failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            Error::Timeout { url }
        } else {
            Error::Transport(err)
        }
    }

    /// Returns true if the request exceeded its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true for connection-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns true for failures raised by extraction logic.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application { .. })
    }

    /// The HTTP status attached to an application failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for wireprobe operations.
pub type Result<T> = core::result::Result<T, Error>;
