//! Source-of-truth movie catalog.
//!
//! # File layout
//!
//! ```yaml
//! featured: [Quentin Tarantino, Hans Zimmer]   # movies pulled in + clozed
//! extra_clozed: [Samuel L. Jackson]            # clozed wherever they appear
//! movies:
//!   - id: 680
//!     title: Pulp Fiction
//!     release_date: 1994-09-10
//!     popularity: 71.3
//!     genres: [Crime, Thriller]
//!     images: [/d5iIlFn5s0ImszYzBPb8JPIfbXD.jpg]
//!     credits:
//!       - { name: Quentin Tarantino, job: Director }
//!       - { name: Samuel L. Jackson, job: Cast }
//! ```
//!
//! [`Catalog::records`] selects the movies crediting a featured person and
//! converts them into [`MovieRecord`]s ready for reconciliation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{AttributeValue, MovieRecord, Picture, Role};

/// Base URL poster paths are resolved against.
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

// ---------------------------------------------------------------------------
// 1. File model
// ---------------------------------------------------------------------------

/// One credit line as it appears in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    /// TMDb job title, e.g. `Director` or `Original Music Composer`.
    pub job: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    /// TMDb poster paths (`/<file>.jpg`).
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub credits: Vec<Credit>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub featured: Vec<String>,
    #[serde(default)]
    pub extra_clozed: Vec<String>,
    #[serde(default)]
    pub movies: Vec<CatalogMovie>,
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a catalog from `path`.
///
/// Returns `CatalogError::NotFound` if absent,
/// `CatalogError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| CatalogError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

// ---------------------------------------------------------------------------
// 3. Conversion
// ---------------------------------------------------------------------------

/// Map a TMDb job title onto a note role. Unknown jobs yield `None`.
pub fn role_for_job(job: &str) -> Option<Role> {
    match job.trim() {
        "Cast" => Some(Role::Cast),
        "Director" => Some(Role::Director),
        "Composer" | "Original Music Composer" | "Music" | "Songs" => Some(Role::Composer),
        "Writer" => Some(Role::Writer),
        "Cinematography" => Some(Role::Cinematographer),
        _ => None,
    }
}

/// Turn a TMDb poster path into a picture reference.
///
/// Paths without a leading `/` are not TMDb paths and yield `None`.
pub fn picture_from_path(path: &str) -> Option<Picture> {
    let filename = path.strip_prefix('/')?;
    if filename.is_empty() {
        return None;
    }
    Some(Picture {
        filename: filename.to_string(),
        url: format!("{TMDB_IMAGE_BASE}/{filename}"),
    })
}

impl CatalogMovie {
    fn credits_person(&self, name: &str) -> bool {
        self.credits.iter().any(|c| c.name == name)
    }

    /// Build a record; credits of anyone in `clozed` become clozes.
    pub fn to_record(&self, clozed: &HashSet<&str>) -> MovieRecord {
        let mut record = MovieRecord::new(self.id, self.title.clone());
        record.release_year = self.release_date.map(|d| d.year()).unwrap_or_default();
        record.popularity = self.popularity;
        record.genres = self.genres.clone();

        for path in &self.images {
            match picture_from_path(path) {
                Some(picture) => record.pictures.push(picture),
                None => tracing::warn!(movie = %self.title, path = %path, "no image in path"),
            }
        }

        let mut seen: HashSet<(&str, Role)> = HashSet::new();
        for credit in &self.credits {
            let Some(role) = role_for_job(&credit.job) else {
                tracing::warn!(movie = %self.title, job = %credit.job, "invalid job type");
                continue;
            };
            if !seen.insert((credit.name.as_str(), role)) {
                continue;
            }
            let is_cloze = clozed.contains(credit.name.as_str());
            record
                .people_mut(role)
                .push(AttributeValue::new(credit.name.clone(), is_cloze));
        }
        record
    }
}

impl Catalog {
    /// Every name whose credits are rendered as clozes.
    pub fn clozed_names(&self) -> HashSet<&str> {
        self.featured
            .iter()
            .chain(self.extra_clozed.iter())
            .map(String::as_str)
            .collect()
    }

    /// Records to publish, in featured order.
    ///
    /// For each featured person, their movies are taken by popularity
    /// (highest first). A movie credited to several featured people is
    /// emitted once, at its first position.
    pub fn records(&self) -> Vec<MovieRecord> {
        let clozed = self.clozed_names();
        let mut added: HashSet<i64> = HashSet::new();
        let mut records = Vec::new();

        for person in &self.featured {
            let mut movies: Vec<&CatalogMovie> = self
                .movies
                .iter()
                .filter(|m| m.credits_person(person))
                .collect();
            if movies.is_empty() {
                tracing::warn!(person = %person, "featured person has no movies in catalog");
                continue;
            }
            movies.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));

            for movie in movies {
                if added.insert(movie.id) {
                    records.push(movie.to_record(&clozed));
                }
            }
        }
        records
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
