//! Error types for cinedeck-sync.

use thiserror::Error;

use cinedeck_core::error::DecodeError;
use cinedeck_renderer::RenderError;

/// Failures reported by a [`RemoteStore`](crate::remote::RemoteStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Another note in the collection already has this first field.
    #[error("cannot create note because it is a duplicate")]
    DuplicateTitle,

    /// Transport, protocol or server-side failure.
    #[error("remote communication error: {0}")]
    Communication(String),
}

/// All errors that can arise from reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The record has no cloze value and must not be published.
    #[error("record {external_id} has no cloze value")]
    InvalidRecord { external_id: i64 },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Every create attempt hit a duplicate title.
    #[error("record {external_id}: title still a duplicate after {attempts} attempts")]
    DuplicateTitleExhausted { external_id: i64, attempts: u32 },

    /// The remote reported success but handed back id 0.
    #[error("record {external_id}: remote returned a zero id after {operation}")]
    ZeroIdentifier {
        external_id: i64,
        operation: &'static str,
    },

    /// A stored note could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A worker died before reporting (panic or cancelled task).
    #[error("worker failed: {0}")]
    Worker(String),

    /// At least one upsert in a batch failed.
    #[error("{} upsert(s) failed; garbage collection skipped", failures.len())]
    Batch { failures: Vec<RecordFailure> },
}

impl SyncError {
    /// Whether the failure came from talking to the remote store.
    ///
    /// Duplicate-title exhaustion counts: it surfaces as a communication
    /// failure once retries run out.
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            SyncError::Remote(_) | SyncError::DuplicateTitleExhausted { .. }
        )
    }
}

/// One record that failed inside a batch.
#[derive(Debug)]
pub struct RecordFailure {
    /// `None` when the worker died before it could report.
    pub external_id: Option<i64>,
    pub title: Option<String>,
    pub error: SyncError,
}

impl std::fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.external_id, &self.title) {
            (Some(id), Some(title)) => write!(f, "{title} ({id}): {}", self.error),
            (Some(id), None) => write!(f, "{id}: {}", self.error),
            _ => write!(f, "{}", self.error),
        }
    }
}
