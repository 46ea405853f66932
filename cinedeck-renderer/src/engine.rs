//! Tera rendering engine: [`TemplateEngine`] and the note-level [`Renderer`].
//!
//! # Templates
//!
//! | Name           | Renders                                      |
//! |----------------|----------------------------------------------|
//! | `people.tera`  | `People` field, role blocks with cloze marks |
//! | `image.tera`   | `Image` field, one `<img>` per picture       |
//!
//! Names end in `.tera`, so Tera does not HTML-escape the output; the
//! markup is stored as-is in the note field.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use cinedeck_core::types::{MovieRecord, Picture};

use crate::context::{ImageContext, PeopleContext};
use crate::error::RenderError;

pub const PEOPLE_TEMPLATE: &str = "people.tera";
pub const IMAGE_TEMPLATE: &str = "image.tera";

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (PEOPLE_TEMPLATE, include_str!("templates/people.tera")),
    (IMAGE_TEMPLATE, include_str!("templates/image.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

/// Every `.tera` file under `dir`, recursively.
fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_dir() {
            collect_template_files(&path, out)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("tera") {
            out.push(path);
        }
    }
    Ok(())
}

/// Overrides keyed by path relative to `dir`, so `people.tera` replaces the
/// embedded people template. A missing directory yields none.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files
        .into_iter()
        .map(|path| {
            let name = path
                .strip_prefix(dir)
                .unwrap_or(path.as_path())
                .to_string_lossy()
                .replace('\\', "/");
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            Ok((name, contents))
        })
        .collect()
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        templates.extend(load_user_templates(dir)?);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded
/// defaults by relative path.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    pub fn render(&self, name: &str, ctx: &tera::Context) -> Result<String, RenderError> {
        Ok(self.tera.render(name, ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders the markup fields of a movie note.
///
/// Create once and share; rendering is read-only and deterministic.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    /// Embedded templates, overridden by any found in `dir`.
    pub fn with_template_dir(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(dir)?,
        })
    }

    /// The `People` field: one block per non-empty role, numbered clozes.
    pub fn render_people(&self, record: &MovieRecord) -> Result<String, RenderError> {
        let ctx = PeopleContext::from_record(record).to_tera_context()?;
        self.engine.render(PEOPLE_TEMPLATE, &ctx)
    }

    /// The `Image` field: `<img src='file'>` per picture, in order.
    pub fn render_images(&self, pictures: &[Picture]) -> Result<String, RenderError> {
        let ctx = ImageContext::new(pictures).to_tera_context()?;
        self.engine.render(IMAGE_TEMPLATE, &ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cinedeck_core::types::AttributeValue;

    fn record() -> MovieRecord {
        let mut record = MovieRecord::new(1, "Example");
        record.director = vec![AttributeValue::cloze("A")];
        record.cast = vec![AttributeValue::plain("B"), AttributeValue::cloze("C")];
        record
    }

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("Renderer::new should succeed with embedded templates");
    }

    #[test]
    fn people_block_numbers_clozes_across_roles() {
        let out = Renderer::new().unwrap().render_people(&record()).unwrap();
        assert_eq!(
            out,
            "Director(s):<br />\n{{c1::A}}\n<br /><br />\nCast:<br />\nB, {{c2::C}}\n<br /><br />\n"
        );
    }

    #[test]
    fn empty_roles_are_omitted() {
        let out = Renderer::new().unwrap().render_people(&record()).unwrap();
        assert!(!out.contains("Composer(s)"));
        assert!(!out.contains("Writer(s)"));
        assert!(!out.contains("Cinematographer(s)"));
    }

    #[test]
    fn content_is_not_html_escaped() {
        let mut r = MovieRecord::new(2, "Escapes");
        r.writer = vec![AttributeValue::plain("Coen & Coen")];
        let out = Renderer::new().unwrap().render_people(&r).unwrap();
        assert!(out.contains("Coen & Coen"), "got: {out}");
    }

    #[test]
    fn images_render_in_order() {
        let pictures = vec![
            Picture {
                filename: "a.jpg".into(),
                url: "https://image.tmdb.org/t/p/w500/a.jpg".into(),
            },
            Picture {
                filename: "b.jpg".into(),
                url: "https://image.tmdb.org/t/p/w500/b.jpg".into(),
            },
        ];
        let out = Renderer::new().unwrap().render_images(&pictures).unwrap();
        assert_eq!(out, "<img src='a.jpg'><img src='b.jpg'>");
        assert_eq!(Renderer::new().unwrap().render_images(&[]).unwrap(), "");
    }

    #[test]
    fn no_crlf_in_rendered_output() {
        let out = Renderer::new().unwrap().render_people(&record()).unwrap();
        assert!(!out.contains('\r'), "line endings not normalised");
    }
}
