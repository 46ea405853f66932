//! Semantic equality between two [`MovieRecord`]s.
//!
//! Every field check runs even after one fails, so the returned
//! [`Comparison`] lists all differing fields. Only [`Comparison::is_equal`]
//! feeds control flow; the mismatch list is for logs and `cinedeck diff`.

use crate::types::{AttributeValue, MovieRecord, Picture, Role};

/// One field that differs between two records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub left: String,
    pub right: String,
}

/// Outcome of comparing two records field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub mismatches: Vec<FieldMismatch>,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        self.mismatches.is_empty()
    }

    fn check<T: std::fmt::Debug + PartialEq>(&mut self, field: &'static str, left: T, right: T) {
        if left != right {
            self.mismatches.push(FieldMismatch {
                field,
                left: format!("{left:?}"),
                right: format!("{right:?}"),
            });
        }
    }
}

/// Popularity as stored in the note field: two decimals.
pub fn popularity_text(popularity: f64) -> String {
    format!("{popularity:.2}")
}

/// Two significant digits, scientific notation, of the stored value.
///
/// Both sides are first rounded to the stored two decimals, so a local
/// value and its own round-tripped text always share a key.
pub fn popularity_key(popularity: f64) -> String {
    let stored: f64 = popularity_text(popularity).parse().unwrap_or(popularity);
    format!("{stored:.1e}")
}

/// Lexicographic order; input order is irrelevant for genres.
pub fn normalize_strings(values: &[String]) -> Vec<String> {
    let mut normalized = values.to_vec();
    normalized.sort();
    normalized
}

/// Clozes first, then by content ascending.
pub fn normalize_people(values: &[AttributeValue]) -> Vec<AttributeValue> {
    let mut normalized = values.to_vec();
    normalized.sort_by(|a, b| {
        b.is_cloze()
            .cmp(&a.is_cloze())
            .then_with(|| a.content().cmp(b.content()))
    });
    normalized
}

fn pictures_differ(left: &[Picture], right: &[Picture]) -> bool {
    // Decoded notes never carry pictures, so an empty side skips the check.
    !left.is_empty() && !right.is_empty() && left != right
}

/// Compare `left` and `right`, collecting every differing field.
pub fn compare(left: &MovieRecord, right: &MovieRecord) -> Comparison {
    let mut cmp = Comparison::default();

    cmp.check("external_id", left.external_id, right.external_id);
    cmp.check(
        "popularity",
        popularity_key(left.popularity),
        popularity_key(right.popularity),
    );
    cmp.check("title", &left.title, &right.title);
    cmp.check("release_year", left.release_year, right.release_year);
    cmp.check(
        "genres",
        normalize_strings(&left.genres),
        normalize_strings(&right.genres),
    );
    for role in [
        Role::Cast,
        Role::Director,
        Role::Composer,
        Role::Writer,
        Role::Cinematographer,
    ] {
        cmp.check(
            role.tag_key(),
            normalize_people(left.people(role)),
            normalize_people(right.people(role)),
        );
    }
    if pictures_differ(&left.pictures, &right.pictures) {
        cmp.mismatches.push(FieldMismatch {
            field: "pictures",
            left: format!("{:?}", left.pictures),
            right: format!("{:?}", right.pictures),
        });
    }

    cmp
}

pub fn is_equal(left: &MovieRecord, right: &MovieRecord) -> bool {
    compare(left, right).is_equal()
}
