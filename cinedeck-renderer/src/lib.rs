//! # cinedeck-renderer
//!
//! Tera-based rendering of the markup fields stored on a movie note.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cinedeck_core::types::MovieRecord;
//! use cinedeck_renderer::Renderer;
//!
//! fn people_field(record: &MovieRecord) -> Option<String> {
//!     let renderer = Renderer::new().ok()?;
//!     renderer.render_people(record).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{ImageContext, PeopleContext};
pub use engine::{Renderer, TemplateEngine};
pub use error::RenderError;
