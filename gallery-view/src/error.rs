use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Gallery API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        /// The `error` field of the response body, when it had one
        message: Option<String>,
    },
}

impl ApiError {
    /// Error text sent by the server, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::Http(_) => None,
        }
    }
}

/// Failures of the clipboard seam
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No asynchronous clipboard API in this environment
    #[error("Clipboard API unavailable")]
    Unavailable,

    #[error("Clipboard write failed: {0}")]
    Failed(String),
}
