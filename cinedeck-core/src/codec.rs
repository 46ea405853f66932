//! Tag codec. The only place structured values become flat tag strings.
//!
//! # Format
//!
//! ```text
//! <key>:<value>[:cloze]
//! ```
//!
//! Spaces in `value` are escaped to `_`. Decoding turns every `_` back into a
//! space, so a literal underscore in source content comes back as a space.
//! That loss is accepted; nothing in the catalog relies on underscores.

use crate::types::{AttributeValue, MovieRecord, Role};

/// Suffix marking a tag's value as a cloze.
pub const CLOZE_SUFFIX: &str = ":cloze";

/// Key of the single external-id tag.
pub const TAG_EXTERNAL_ID: &str = "tmdb";

/// Key of the per-genre tags.
pub const TAG_GENRES: &str = "genres";

pub fn escape(value: &str) -> String {
    value.replace(' ', "_")
}

pub fn unescape(value: &str) -> String {
    value.replace('_', " ")
}

/// Encode one value as `<key>:<escaped value>[:cloze]`.
pub fn encode(key: &str, value: &str, is_cloze: bool) -> String {
    let suffix = if is_cloze { CLOZE_SUFFIX } else { "" };
    format!("{key}:{}{suffix}", escape(value))
}

fn strip_key<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    tag.strip_prefix(key)?.strip_prefix(':')
}

/// First value stored under `key`, unescaped.
///
/// Used for required scalar tags; callers decide what a missing tag means.
pub fn decode_one(tags: &[String], key: &str) -> Option<String> {
    tags.iter()
        .find_map(|tag| strip_key(tag, key))
        .map(unescape)
}

/// Every plain value stored under `key`, in stored order.
pub fn decode_strings(tags: &[String], key: &str) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| strip_key(tag, key))
        .map(unescape)
        .collect()
}

/// Every value stored under `key` with its cloze marker, in stored order.
pub fn decode_all(tags: &[String], key: &str) -> Vec<AttributeValue> {
    tags.iter()
        .filter_map(|tag| strip_key(tag, key))
        .map(|rest| match rest.strip_suffix(CLOZE_SUFFIX) {
            Some(content) => AttributeValue::cloze(unescape(content)),
            None => AttributeValue::plain(unescape(rest)),
        })
        .collect()
}

/// Builder for a full tag set. Each pass starts from an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.0.push(encode(key, value, false));
        self
    }

    pub fn set_many(mut self, key: &str, values: &[String]) -> Self {
        self.0
            .extend(values.iter().map(|value| encode(key, value, false)));
        self
    }

    pub fn set_many_cloze(mut self, key: &str, values: &[AttributeValue]) -> Self {
        self.0.extend(
            values
                .iter()
                .map(|value| encode(key, value.content(), value.is_cloze())),
        );
        self
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Full tag set for `record`: one external-id tag, one tag per credit, one
/// tag per genre.
pub fn encode_record(record: &MovieRecord) -> Tags {
    let tags = Tags::new().set(TAG_EXTERNAL_ID, &record.external_id.to_string());
    let tags = [
        Role::Cast,
        Role::Composer,
        Role::Writer,
        Role::Director,
        Role::Cinematographer,
    ]
    .into_iter()
    .fold(tags, |tags, role| {
        tags.set_many_cloze(role.tag_key(), record.people(role))
    });
    tags.set_many(TAG_GENRES, &record.genres)
}

/// Search-filter form of the external-id tag (`tag:tmdb:<id>`).
pub fn external_id_filter(external_id: i64) -> String {
    format!("tag:{}", encode(TAG_EXTERNAL_ID, &external_id.to_string(), false))
}
