//! Build the full remote payload for a record.

use cinedeck_core::{codec, compare};
use cinedeck_core::note::{
    FIELD_GENRES, FIELD_IMAGE, FIELD_PEOPLE, FIELD_POPULARITY, FIELD_RELEASE_DATE, FIELD_TITLE,
};
use cinedeck_core::types::MovieRecord;
use cinedeck_renderer::{RenderError, Renderer};

use crate::remote::NotePayload;

/// Four-digit year; an unknown year (0) is stored empty.
pub fn format_year(year: i32) -> String {
    if year == 0 {
        String::new()
    } else {
        format!("{year:04}")
    }
}

pub fn format_popularity(popularity: f64) -> String {
    compare::popularity_text(popularity)
}

/// Fields, a freshly built tag set, and pictures for `record`.
pub fn build_payload(record: &MovieRecord, renderer: &Renderer) -> Result<NotePayload, RenderError> {
    let mut payload = NotePayload::default();
    let fields = &mut payload.fields;
    fields.insert(FIELD_TITLE.to_string(), record.title.clone());
    fields.insert(FIELD_RELEASE_DATE.to_string(), format_year(record.release_year));
    fields.insert(FIELD_PEOPLE.to_string(), renderer.render_people(record)?);
    fields.insert(FIELD_GENRES.to_string(), record.genres.join(", "));
    fields.insert(FIELD_IMAGE.to_string(), renderer.render_images(&record.pictures)?);
    fields.insert(
        FIELD_POPULARITY.to_string(),
        format_popularity(record.popularity),
    );
    payload.tags = codec::encode_record(record).into_vec();
    payload.pictures = record.pictures.clone();
    Ok(payload)
}
