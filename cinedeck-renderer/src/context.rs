//! Template contexts, serializable rendering payloads built from a [`MovieRecord`].
//!
//! Cloze numbers are assigned here, not in the template: templates only
//! print what the context already decided.

use serde::{Deserialize, Serialize};

use cinedeck_core::types::{MovieRecord, Picture, Role};

use crate::error::RenderError;

/// One credited person, with its cloze number if hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCtx {
    pub content: String,
    /// `Some(n)` renders as `{{cn::content}}`.
    pub cloze: Option<u32>,
}

/// One non-empty role block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCtx {
    pub role: Role,
    pub heading: String,
    pub entries: Vec<EntryCtx>,
}

/// Payload for `people.tera`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleContext {
    pub sections: Vec<SectionCtx>,
}

impl PeopleContext {
    /// Build sections in [`Role::all`] order, skipping empty roles.
    ///
    /// One counter runs across every section, so cloze numbers are unique
    /// within the card and never restart per role.
    pub fn from_record(record: &MovieRecord) -> Self {
        let mut counter = 0u32;
        let sections = Role::all()
            .iter()
            .filter(|role| !record.people(**role).is_empty())
            .map(|role| SectionCtx {
                role: *role,
                heading: role.heading().to_string(),
                entries: record
                    .people(*role)
                    .iter()
                    .map(|value| EntryCtx {
                        content: value.content().to_string(),
                        cloze: value.is_cloze().then(|| {
                            counter += 1;
                            counter
                        }),
                    })
                    .collect(),
            })
            .collect();
        PeopleContext { sections }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Payload for `image.tera`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContext {
    pub pictures: Vec<Picture>,
}

impl ImageContext {
    pub fn new(pictures: &[Picture]) -> Self {
        ImageContext {
            pictures: pictures.to_vec(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinedeck_core::types::AttributeValue;

    #[test]
    fn counter_is_shared_across_sections() {
        let mut record = MovieRecord::new(1, "Heat");
        record.cast = vec![
            AttributeValue::cloze("Al Pacino"),
            AttributeValue::plain("Val Kilmer"),
            AttributeValue::cloze("Robert De Niro"),
        ];
        record.director = vec![AttributeValue::cloze("Michael Mann")];

        let ctx = PeopleContext::from_record(&record);
        assert_eq!(ctx.sections.len(), 2);
        assert_eq!(ctx.sections[0].role, Role::Director);
        assert_eq!(ctx.sections[0].entries[0].cloze, Some(1));
        let cast: Vec<_> = ctx.sections[1].entries.iter().map(|e| e.cloze).collect();
        assert_eq!(cast, vec![Some(2), None, Some(3)]);
    }

    #[test]
    fn empty_record_has_no_sections() {
        let ctx = PeopleContext::from_record(&MovieRecord::new(1, "Empty"));
        assert!(ctx.sections.is_empty());
    }

    #[test]
    fn to_tera_context_succeeds() {
        let ctx = ImageContext::new(&[Picture {
            filename: "a.jpg".into(),
            url: "https://example.com/a.jpg".into(),
        }]);
        ctx.to_tera_context().expect("context conversion");
    }
}
