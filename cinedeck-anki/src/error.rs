use thiserror::Error;

use cinedeck_sync::RemoteError;

/// AnkiConnect's message for a first-field clash on `addNote`.
pub const DUPLICATE_NOTE_MESSAGE: &str = "cannot create note because it is a duplicate";

/// Error surface for the AnkiConnect client.
#[derive(Debug, Error)]
pub enum AnkiError {
    /// Connection refused, timeout, TLS, or a non-2xx status.
    #[error("AnkiConnect request '{action}' failed: {source}")]
    Http {
        action: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The response body was not the expected JSON.
    #[error("AnkiConnect response to '{action}' unreadable: {source}")]
    Decode {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// AnkiConnect answered with an `error` value.
    #[error("AnkiConnect '{action}' error: {message}")]
    Api {
        action: &'static str,
        message: String,
    },

    /// Neither `result` nor `error` was set where a result is required.
    #[error("AnkiConnect '{action}' returned no result")]
    MissingResult { action: &'static str },

    #[error("AnkiConnect API version {found} is older than required {required}")]
    UnsupportedVersion { found: u32, required: u32 },

    /// The blocking worker running the request died.
    #[error("AnkiConnect worker failed: {0}")]
    Worker(String),
}

impl AnkiError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, AnkiError::Api { message, .. } if message == DUPLICATE_NOTE_MESSAGE)
    }
}

impl From<AnkiError> for RemoteError {
    fn from(err: AnkiError) -> Self {
        if err.is_duplicate() {
            RemoteError::DuplicateTitle
        } else {
            RemoteError::Communication(err.to_string())
        }
    }
}
