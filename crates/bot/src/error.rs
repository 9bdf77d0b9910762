//! Error types for the chat platform and diagram service adapters.
//!
//! None of these reach the user: the handler logs them and answers with a
//! fixed "try again later" text.

use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the chat platform.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// The HTTP request could not be completed.
    #[error("chat platform transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered with `ok: false`.
    #[error("chat platform rejected '{method}': {description}")]
    Api {
        /// Bot API method name (e.g. `sendMediaGroup`).
        method: &'static str,
        /// Platform-supplied description.
        description: String,
    },

    /// A photo to upload could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// The unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of one diagram generation attempt.
#[derive(Debug, Error)]
pub enum DiagramFetchError {
    /// The HTTP request could not be completed.
    #[error("diagram service transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The diagram service answered with a non-200 status.
    #[error("diagram service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (usually `{ "detail": ... }`).
        body: String,
    },
}
