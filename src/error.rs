//! Error types for RAGFlow client operations.
//!
//! All fallible operations return [`Result<T>`]. Streaming calls surface at most
//! one [`Error`] per stream, after every event that preceded it.
//!
//! | Variant | Raised when | Stream started? |
//! |---------|-------------|-----------------|
//! | `Transport` | the request could not be sent | no |
//! | `HttpStatus` / `UnexpectedStatus` | non-2xx initial response | no |
//! | `Api` | a frame or envelope carries a non-zero `code` | yes / n.a. |
//! | `Cancelled` | the caller cancelled the stream | maybe |
//! | `Read` / `LineTooLong` | the body could not be scanned | yes |

use serde::{Deserialize, Serialize};

/// Boxed error source used for body read failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A business-level failure reported by the service as `{code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("API error {code}: {message}")]
pub struct ApiError {
    pub code: i64,
    #[serde(default, deserialize_with = "crate::models::string_or_null")]
    pub message: String,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors returned by [`RagflowClient`](crate::RagflowClient) and [`ChatStream`](crate::ChatStream).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be built or sent.
    #[error("error making request: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-success status whose body decoded as an API error.
    #[error("{error}")]
    HttpStatus { status: u16, error: ApiError },

    /// Non-success status whose body was not a recognizable API error.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The service reported a logical failure (in-stream frame or response envelope).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The caller cancelled the stream.
    #[error("stream cancelled")]
    Cancelled,

    /// The response body failed mid-read.
    #[error("error reading stream: {0}")]
    Read(#[source] BoxError),

    /// A single line exceeded the configured maximum frame size.
    #[error("error reading stream: line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// A non-streaming response body could not be decoded.
    #[error("error decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The `{code, message}` payload, if the service reported one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) | Error::HttpStatus { error: e, .. } => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the initial response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}
