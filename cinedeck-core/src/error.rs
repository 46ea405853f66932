//! Error types for cinedeck-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::NoteId;

/// Errors raised while turning a stored note back into a [`MovieRecord`].
///
/// [`MovieRecord`]: crate::types::MovieRecord
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A scalar tag the record cannot exist without (e.g. the external id).
    #[error("note {note_id}: required tag '{key}' missing")]
    MissingTag { note_id: NoteId, key: &'static str },

    /// A field is absent, or empty where a value is required.
    #[error("note {note_id}: required field '{field}' missing")]
    MissingField {
        note_id: NoteId,
        field: &'static str,
    },

    /// A numeric field or tag did not parse.
    #[error("note {note_id}: cannot parse {what} from '{value}'")]
    InvalidNumber {
        note_id: NoteId,
        what: &'static str,
        value: String,
    },
}

/// Errors from loading the source catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O failure while reading the catalog.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse catalog at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The catalog file does not exist.
    #[error("catalog not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors from loading or writing `~/.cinedeck/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.cinedeck/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
