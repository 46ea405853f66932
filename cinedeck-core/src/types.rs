//! Domain types for movie notes.
//!
//! A [`MovieRecord`] is the canonical structured form of one movie. Person
//! credits are grouped per [`Role`]; each credit is an [`AttributeValue`]
//! that may be hidden as a cloze on the rendered card.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque handle of a note in the remote store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl NoteId {
    /// A zero id is what a silently failed create/update looks like.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One person credited in a role.
///
/// Fields are private: a value is fixed once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeValue {
    content: String,
    is_cloze: bool,
}

impl AttributeValue {
    pub fn new(content: impl Into<String>, is_cloze: bool) -> Self {
        Self {
            content: content.into(),
            is_cloze,
        }
    }

    /// A value rendered as plain text.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    /// A value hidden behind a numbered cloze marker.
    pub fn cloze(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_cloze(&self) -> bool {
        self.is_cloze
    }
}

/// Reference to a poster image attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Picture {
    /// Media file name inside the remote collection.
    pub filename: String,
    /// Where the remote store downloads the image from.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The person categories a movie note carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Director,
    Composer,
    Writer,
    Cinematographer,
    Cast,
}

impl Role {
    /// All roles in rendering order.
    pub fn all() -> &'static [Role] {
        &[
            Role::Director,
            Role::Composer,
            Role::Writer,
            Role::Cinematographer,
            Role::Cast,
        ]
    }

    /// Key used for this role's tags (`<key>:<name>[:cloze]`).
    pub fn tag_key(self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Composer => "composer",
            Role::Writer => "writer",
            Role::Cinematographer => "cinematographer",
            Role::Cast => "cast",
        }
    }

    /// Section heading in the rendered people block.
    pub fn heading(self) -> &'static str {
        match self {
            Role::Director => "Director(s)",
            Role::Composer => "Composer(s)",
            Role::Writer => "Writer(s)",
            Role::Cinematographer => "Cinematographer(s)",
            Role::Cast => "Cast",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_key())
    }
}

// ---------------------------------------------------------------------------
// MovieRecord
// ---------------------------------------------------------------------------

/// Canonical structured representation of one movie.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Catalog (TMDb) id; the dedup key against the remote store.
    pub external_id: i64,
    /// Set once the note exists remotely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<NoteId>,
    pub title: String,
    pub release_year: i32,
    pub popularity: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<AttributeValue>,
    #[serde(default)]
    pub director: Vec<AttributeValue>,
    #[serde(default)]
    pub composer: Vec<AttributeValue>,
    #[serde(default)]
    pub writer: Vec<AttributeValue>,
    #[serde(default)]
    pub cinematographer: Vec<AttributeValue>,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

impl MovieRecord {
    pub fn new(external_id: i64, title: impl Into<String>) -> Self {
        Self {
            external_id,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Credits for `role`, in stored order.
    pub fn people(&self, role: Role) -> &[AttributeValue] {
        match role {
            Role::Director => &self.director,
            Role::Composer => &self.composer,
            Role::Writer => &self.writer,
            Role::Cinematographer => &self.cinematographer,
            Role::Cast => &self.cast,
        }
    }

    pub fn people_mut(&mut self, role: Role) -> &mut Vec<AttributeValue> {
        match role {
            Role::Director => &mut self.director,
            Role::Composer => &mut self.composer,
            Role::Writer => &mut self.writer,
            Role::Cinematographer => &mut self.cinematographer,
            Role::Cast => &mut self.cast,
        }
    }

    /// Number of cloze-marked credits across every role.
    pub fn cloze_count(&self) -> usize {
        Role::all()
            .iter()
            .flat_map(|role| self.people(*role))
            .filter(|value| value.is_cloze())
            .count()
    }

    /// Only records with at least one cloze may be published.
    pub fn has_cloze(&self) -> bool {
        self.cloze_count() > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
