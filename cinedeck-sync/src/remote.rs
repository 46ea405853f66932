//! The remote flashcard store seen by the reconciler.

use std::collections::BTreeMap;

use async_trait::async_trait;

use cinedeck_core::note::RawNote;
use cinedeck_core::types::{NoteId, Picture};

use crate::error::RemoteError;

/// Everything written to a note: fields, tags and attached pictures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePayload {
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub pictures: Vec<Picture>,
}

/// A note to create in `deck` using the `model` note type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub deck: String,
    pub model: String,
    pub payload: NotePayload,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Notes matching a search filter.
    async fn query(&self, filter: &str) -> Result<Vec<RawNote>, RemoteError>;

    /// Ids of notes matching a search filter.
    async fn find_ids(&self, filter: &str) -> Result<Vec<NoteId>, RemoteError> {
        Ok(self
            .query(filter)
            .await?
            .into_iter()
            .map(|note| note.id)
            .collect())
    }

    /// Create a note. A clash on the first field is [`RemoteError::DuplicateTitle`].
    async fn create(&self, note: &NewNote) -> Result<NoteId, RemoteError>;

    /// Replace fields and tags of an existing note.
    async fn update(&self, id: NoteId, payload: &NotePayload) -> Result<NoteId, RemoteError>;

    /// Delete notes in one call.
    async fn delete(&self, ids: &[NoteId]) -> Result<(), RemoteError>;
}
