//! Error types for the dcdns agent
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dcdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dcdns agent
#[derive(Error, Debug)]
pub enum Error {
    /// The change-set was empty; there was nothing to submit.
    ///
    /// Benign by design: the submitter reports it before touching the
    /// network and the cycle continues.
    #[error("no address changes to submit")]
    NothingToUpdate,

    /// The update endpoint answered with a non-2xx status
    #[error("update endpoint rejected the request: HTTP {status}: {body}")]
    UpdateRejected {
        /// HTTP status code of the rejection
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an update-rejected error from a status code and response body
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::UpdateRejected {
            status,
            body: body.into(),
        }
    }

    /// Whether this error is an expected, non-failure outcome
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NothingToUpdate)
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
