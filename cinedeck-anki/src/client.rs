//! Blocking AnkiConnect client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use cinedeck_core::note::RawNote;
use cinedeck_core::types::NoteId;
use cinedeck_sync::{NewNote, NotePayload};

use crate::error::AnkiError;
use crate::protocol::{
    AddNote, DeckParams, NoteInfo, NoteParams, NotesParams, QueryParams, Request, Response,
    UpdateNote, API_VERSION,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One AnkiConnect endpoint. Every call is a single blocking HTTP POST.
#[derive(Debug, Clone)]
pub struct AnkiClient {
    agent: ureq::Agent,
    url: String,
}

impl AnkiClient {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn call<P, T>(&self, action: &'static str, params: Option<P>) -> Result<Option<T>, AnkiError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(action, url = %self.url, "AnkiConnect request");
        let request = Request {
            action,
            version: API_VERSION,
            params,
        };
        let response: Response<T> = self
            .agent
            .post(&self.url)
            .send_json(&request)
            .map_err(|source| AnkiError::Http {
                action,
                source: Box::new(source),
            })?
            .into_json()
            .map_err(|source| AnkiError::Decode { action, source })?;

        match response.error {
            Some(message) => Err(AnkiError::Api { action, message }),
            None => Ok(response.result),
        }
    }

    fn invoke<P, T>(&self, action: &'static str, params: P) -> Result<T, AnkiError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        self.call(action, Some(params))?
            .ok_or(AnkiError::MissingResult { action })
    }

    /// Ping the server; returns its API version.
    pub fn version(&self) -> Result<u32, AnkiError> {
        self.call::<(), u32>("version", None)?
            .ok_or(AnkiError::MissingResult { action: "version" })
    }

    /// Create `deck` if missing; existing decks are left alone.
    pub fn create_deck(&self, deck: &str) -> Result<i64, AnkiError> {
        self.invoke("createDeck", DeckParams { deck })
    }

    /// Ping the server and reject API versions older than [`API_VERSION`].
    pub fn check_version(&self) -> Result<u32, AnkiError> {
        let found = self.version()?;
        if found < API_VERSION {
            return Err(AnkiError::UnsupportedVersion {
                found,
                required: API_VERSION,
            });
        }
        Ok(found)
    }

    /// Ping, check the API version and make sure `deck` exists.
    pub fn bootstrap(&self, deck: &str) -> Result<(), AnkiError> {
        let found = self.check_version()?;
        self.create_deck(deck)?;
        tracing::info!(url = %self.url, deck, version = found, "connected to AnkiConnect");
        Ok(())
    }

    pub fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, AnkiError> {
        self.invoke("findNotes", QueryParams { query })
    }

    pub fn notes_info(&self, ids: &[NoteId]) -> Result<Vec<RawNote>, AnkiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let infos: Vec<NoteInfo> = self.invoke("notesInfo", NotesParams { notes: ids })?;
        Ok(infos.into_iter().map(RawNote::from).collect())
    }

    /// `findNotes` followed by `notesInfo`.
    pub fn query(&self, query: &str) -> Result<Vec<RawNote>, AnkiError> {
        let ids = self.find_notes(query)?;
        self.notes_info(&ids)
    }

    pub fn add_note(&self, note: &NewNote) -> Result<NoteId, AnkiError> {
        self.invoke(
            "addNote",
            NoteParams {
                note: AddNote::from_new_note(note),
            },
        )
    }

    /// Rewrite fields and tags of note `id`. AnkiConnect returns no result.
    pub fn update_note(&self, id: NoteId, payload: &NotePayload) -> Result<NoteId, AnkiError> {
        self.call::<_, serde_json::Value>(
            "updateNote",
            Some(NoteParams {
                note: UpdateNote::new(id, payload),
            }),
        )?;
        Ok(id)
    }

    pub fn delete_notes(&self, ids: &[NoteId]) -> Result<(), AnkiError> {
        self.call::<_, serde_json::Value>("deleteNotes", Some(NotesParams { notes: ids }))?;
        Ok(())
    }
}
