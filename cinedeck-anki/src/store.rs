//! [`RemoteStore`] over AnkiConnect.
//!
//! The client is blocking, so each call runs on tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;

use cinedeck_core::note::RawNote;
use cinedeck_core::types::NoteId;
use cinedeck_sync::{NewNote, NotePayload, RemoteError, RemoteStore};

use crate::client::AnkiClient;
use crate::error::AnkiError;

#[derive(Debug, Clone)]
pub struct AnkiStore {
    client: Arc<AnkiClient>,
}

impl AnkiStore {
    pub fn new(client: AnkiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &AnkiClient {
        &self.client
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, RemoteError>
    where
        T: Send + 'static,
        F: FnOnce(&AnkiClient) -> Result<T, AnkiError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || f(&client))
            .await
            .map_err(|err| AnkiError::Worker(err.to_string()))?
            .map_err(RemoteError::from)
    }
}

#[async_trait]
impl RemoteStore for AnkiStore {
    async fn query(&self, filter: &str) -> Result<Vec<RawNote>, RemoteError> {
        let filter = filter.to_string();
        self.blocking(move |client| client.query(&filter)).await
    }

    async fn find_ids(&self, filter: &str) -> Result<Vec<NoteId>, RemoteError> {
        let filter = filter.to_string();
        self.blocking(move |client| client.find_notes(&filter)).await
    }

    async fn create(&self, note: &NewNote) -> Result<NoteId, RemoteError> {
        let note = note.clone();
        self.blocking(move |client| client.add_note(&note)).await
    }

    async fn update(&self, id: NoteId, payload: &NotePayload) -> Result<NoteId, RemoteError> {
        let payload = payload.clone();
        self.blocking(move |client| client.update_note(id, &payload))
            .await
    }

    async fn delete(&self, ids: &[NoteId]) -> Result<(), RemoteError> {
        let ids = ids.to_vec();
        self.blocking(move |client| client.delete_notes(&ids)).await
    }
}
