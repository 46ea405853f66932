//! AnkiConnect backend for the cinedeck remote store.
//!
//! [`AnkiClient`] speaks the JSON-over-HTTP protocol; [`AnkiStore`] adapts
//! it to [`cinedeck_sync::RemoteStore`].

pub mod client;
mod error;
pub mod protocol;
pub mod store;

pub use client::AnkiClient;
pub use error::{AnkiError, DUPLICATE_NOTE_MESSAGE};
pub use store::AnkiStore;
