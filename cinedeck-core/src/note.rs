//! Remote note shape and decoding back into a [`MovieRecord`].
//!
//! Scalars come from fields, everything multi-valued comes from tags via
//! [`crate::codec`]. Pictures are not recovered; the comparator skips the
//! picture check when one side has none.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{self, TAG_EXTERNAL_ID, TAG_GENRES};
use crate::error::DecodeError;
use crate::types::{MovieRecord, NoteId, Role};

pub const FIELD_TITLE: &str = "Movie Title";
pub const FIELD_RELEASE_DATE: &str = "Release Date";
pub const FIELD_PEOPLE: &str = "People";
pub const FIELD_GENRES: &str = "Genres";
pub const FIELD_IMAGE: &str = "Image";
pub const FIELD_POPULARITY: &str = "Popularity";

/// A note as the remote store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawNote {
    pub id: NoteId,
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

/// Decode a stored note into a record carrying its remote id.
pub fn decode_note(raw: &RawNote) -> Result<MovieRecord, DecodeError> {
    let note_id = raw.id;

    let external = codec::decode_one(&raw.tags, TAG_EXTERNAL_ID).ok_or(DecodeError::MissingTag {
        note_id,
        key: TAG_EXTERNAL_ID,
    })?;
    let external_id = external
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidNumber {
            note_id,
            what: "external id",
            value: external.clone(),
        })?;

    let title = match raw.fields.get(FIELD_TITLE) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => {
            return Err(DecodeError::MissingField {
                note_id,
                field: FIELD_TITLE,
            })
        }
    };

    let popularity = match raw.fields.get(FIELD_POPULARITY) {
        Some(value) if !value.is_empty() => {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| DecodeError::InvalidNumber {
                    note_id,
                    what: "popularity",
                    value: value.clone(),
                })?
        }
        _ => {
            return Err(DecodeError::MissingField {
                note_id,
                field: FIELD_POPULARITY,
            })
        }
    };

    // The field must exist; an empty value means the year is unknown.
    let release_year = match raw.fields.get(FIELD_RELEASE_DATE) {
        None => {
            return Err(DecodeError::MissingField {
                note_id,
                field: FIELD_RELEASE_DATE,
            })
        }
        Some(value) if value.trim().is_empty() => 0,
        Some(value) => value
            .trim()
            .parse::<i32>()
            .map_err(|_| DecodeError::InvalidNumber {
                note_id,
                what: "release year",
                value: value.clone(),
            })?,
    };

    let mut record = MovieRecord {
        external_id,
        remote_id: Some(note_id),
        title,
        release_year,
        popularity,
        genres: codec::decode_strings(&raw.tags, TAG_GENRES),
        ..MovieRecord::default()
    };
    for role in Role::all() {
        *record.people_mut(*role) = codec::decode_all(&raw.tags, role.tag_key());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeValue;

    fn raw_note() -> RawNote {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_TITLE.to_string(), "Se7en".to_string());
        fields.insert(FIELD_POPULARITY.to_string(), "41.20".to_string());
        fields.insert(FIELD_RELEASE_DATE.to_string(), "1995".to_string());
        RawNote {
            id: NoteId(1700),
            fields,
            tags: vec![
                "tmdb:807".to_string(),
                "cast:Brad_Pitt".to_string(),
                "cast:Morgan_Freeman:cloze".to_string(),
                "director:David_Fincher".to_string(),
                "genres:Crime".to_string(),
            ],
        }
    }

    #[test]
    fn decodes_fields_and_tags() {
        let record = decode_note(&raw_note()).expect("decode");
        assert_eq!(record.external_id, 807);
        assert_eq!(record.remote_id, Some(NoteId(1700)));
        assert_eq!(record.title, "Se7en");
        assert_eq!(record.release_year, 1995);
        assert!((record.popularity - 41.2).abs() < f64::EPSILON);
        assert_eq!(record.genres, vec!["Crime".to_string()]);
        assert_eq!(record.cast[1], AttributeValue::cloze("Morgan Freeman"));
        assert_eq!(record.director, vec![AttributeValue::plain("David Fincher")]);
        assert!(record.writer.is_empty());
    }

    #[test]
    fn missing_external_id_tag_is_an_error() {
        let mut raw = raw_note();
        raw.tags.retain(|t| !t.starts_with("tmdb:"));
        let err = decode_note(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingTag { key: "tmdb", .. }));
    }

    #[test]
    fn unparseable_popularity_is_an_error() {
        let mut raw = raw_note();
        raw.fields
            .insert(FIELD_POPULARITY.to_string(), "very".to_string());
        let err = decode_note(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber { what: "popularity", .. }));
    }

    #[test]
    fn empty_title_is_missing() {
        let mut raw = raw_note();
        raw.fields.insert(FIELD_TITLE.to_string(), String::new());
        let err = decode_note(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: FIELD_TITLE, .. }));
    }

    #[test]
    fn empty_release_date_means_unknown_year() {
        let mut raw = raw_note();
        raw.fields
            .insert(FIELD_RELEASE_DATE.to_string(), String::new());
        assert_eq!(decode_note(&raw).expect("decode").release_year, 0);
    }
}
