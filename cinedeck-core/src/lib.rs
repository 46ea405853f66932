//! Cinedeck core library: domain types, tag codec, note decoding, comparator,
//! catalog and config persistence.
//!
//! - [`types`]: newtypes and the [`MovieRecord`] model
//! - [`codec`]: `key:value[:cloze]` tag encoding
//! - [`note`]: remote note shape and decoding
//! - [`compare`]: semantic record equality
//! - [`catalog`]: source-of-truth YAML catalog
//! - [`config`]: `~/.cinedeck/config.yaml`

pub mod catalog;
pub mod codec;
pub mod compare;
pub mod config;
pub mod error;
pub mod note;
pub mod types;

pub use catalog::{Catalog, CatalogMovie, Credit};
pub use compare::{compare, is_equal, Comparison, FieldMismatch};
pub use config::Config;
pub use error::{CatalogError, ConfigError, DecodeError};
pub use note::{decode_note, RawNote};
pub use types::{AttributeValue, MovieRecord, NoteId, Picture, Role};
