//! AnkiConnect wire format: one JSON request per HTTP POST.
//!
//! ```json
//! {"action": "findNotes", "version": 6, "params": {"query": "deck:Films"}}
//! {"result": [1496198395707], "error": null}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cinedeck_core::note::RawNote;
use cinedeck_core::types::{NoteId, Picture};
use cinedeck_sync::{NewNote, NotePayload};

/// API version every request is sent with.
pub const API_VERSION: u32 = 6;

#[derive(Debug, Clone, Serialize)]
pub struct Request<'a, P> {
    pub action: &'a str,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<P>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DeckParams<'a> {
    pub deck: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryParams<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotesParams<'a> {
    pub notes: &'a [NoteId],
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteParams<N> {
    pub note: N,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNote<'a> {
    pub deck_name: &'a str,
    pub model_name: &'a str,
    pub fields: &'a BTreeMap<String, String>,
    pub tags: &'a [String],
    pub options: AddOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub picture: Vec<MediaPicture<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    pub allow_duplicate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateNote<'a> {
    pub id: NoteId,
    pub fields: &'a BTreeMap<String, String>,
    pub tags: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub picture: Vec<MediaPicture<'a>>,
}

/// Media to download into the collection. The `Image` field already holds
/// the `<img>` markup, so no field is targeted.
#[derive(Debug, Clone, Serialize)]
pub struct MediaPicture<'a> {
    pub url: &'a str,
    pub filename: &'a str,
    pub fields: [&'a str; 0],
}

fn media(pictures: &[Picture]) -> Vec<MediaPicture<'_>> {
    pictures
        .iter()
        .map(|p| MediaPicture {
            url: &p.url,
            filename: &p.filename,
            fields: [],
        })
        .collect()
}

impl<'a> AddNote<'a> {
    pub fn from_new_note(note: &'a NewNote) -> Self {
        AddNote {
            deck_name: &note.deck,
            model_name: &note.model,
            fields: &note.payload.fields,
            tags: &note.payload.tags,
            options: AddOptions {
                allow_duplicate: false,
            },
            picture: media(&note.payload.pictures),
        }
    }
}

impl<'a> UpdateNote<'a> {
    pub fn new(id: NoteId, payload: &'a NotePayload) -> Self {
        UpdateNote {
            id,
            fields: &payload.fields,
            tags: &payload.tags,
            picture: media(&payload.pictures),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldValue {
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub note_id: NoteId,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl From<NoteInfo> for RawNote {
    fn from(info: NoteInfo) -> Self {
        RawNote {
            id: info.note_id,
            fields: info
                .fields
                .into_iter()
                .map(|(name, field)| (name, field.value))
                .collect(),
            tags: info.tags,
        }
    }
}
