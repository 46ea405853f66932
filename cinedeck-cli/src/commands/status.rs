//! `cinedeck status`: how far the deck is from the catalog.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use cinedeck_core::{catalog, is_equal, CatalogError, Config, MovieRecord};

use super::{connect, home_dir, load_config, TargetArgs};

/// Arguments for `cinedeck status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Catalog file (defaults to the configured one).
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub async fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = load_config(&home, &self.target)?;
        let catalog_path = self
            .catalog
            .clone()
            .unwrap_or_else(|| config.catalog_path_at(&home));
        let local = match catalog::load_at(&catalog_path) {
            Ok(catalog) => Some(catalog.records()),
            Err(CatalogError::NotFound { .. }) => None,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to load catalog '{}'", catalog_path.display()))
            }
        };

        let reconciler = connect(&home, &config, false).await?;
        let remote = reconciler
            .remote_records()
            .await
            .with_context(|| format!("failed to list notes in deck '{}'", config.deck))?;

        let report = build_report(&config, catalog_path, local.as_deref(), remote);
        if self.json {
            return print_json(report);
        }
        print_table(report);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Remote note matches the catalog.
    Current,
    /// Remote note differs; sync would update it.
    Modified,
    /// In the catalog but not in the deck.
    Missing,
    /// In the deck but no longer in the catalog; sync would delete it.
    Orphan,
    /// No catalog to compare against.
    Untracked,
}

#[derive(Debug, Clone)]
struct MovieStatus {
    external_id: i64,
    note_id: Option<i64>,
    title: String,
    release_year: i32,
    clozes: usize,
    signal: Signal,
}

#[derive(Debug, Clone)]
struct StatusReport {
    deck: String,
    model: String,
    anki_url: String,
    catalog: Option<PathBuf>,
    notes: usize,
    movies: Vec<MovieStatus>,
}

impl StatusReport {
    fn count(&self, signal: Signal) -> usize {
        self.movies.iter().filter(|m| m.signal == signal).count()
    }

    fn needs_sync(&self) -> bool {
        self.movies
            .iter()
            .any(|m| matches!(m.signal, Signal::Modified | Signal::Missing | Signal::Orphan))
    }
}

fn row(record: &MovieRecord, signal: Signal) -> MovieStatus {
    MovieStatus {
        external_id: record.external_id,
        note_id: record.remote_id.map(|id| id.0),
        title: record.title.clone(),
        release_year: record.release_year,
        clozes: record.cloze_count(),
        signal,
    }
}

fn build_report(
    config: &Config,
    catalog_path: PathBuf,
    local: Option<&[MovieRecord]>,
    remote: Vec<MovieRecord>,
) -> StatusReport {
    let notes = remote.len();
    let mut by_id: HashMap<i64, MovieRecord> = HashMap::new();
    let mut movies = Vec::new();
    for record in remote {
        if by_id.contains_key(&record.external_id) {
            movies.push(row(&record, Signal::Orphan));
        } else {
            by_id.insert(record.external_id, record);
        }
    }

    if let Some(local) = local {
        for record in local {
            let status = match by_id.remove(&record.external_id) {
                Some(stored) if is_equal(&stored, record) => row(&stored, Signal::Current),
                Some(stored) => row(&stored, Signal::Modified),
                None => row(record, Signal::Missing),
            };
            movies.push(status);
        }
    }

    let leftover = if local.is_some() {
        Signal::Orphan
    } else {
        Signal::Untracked
    };
    let mut rest: Vec<MovieRecord> = by_id.into_values().collect();
    rest.sort_by(|a, b| a.title.cmp(&b.title));
    movies.extend(rest.iter().map(|record| row(record, leftover)));

    StatusReport {
        deck: config.deck.clone(),
        model: config.model.clone(),
        anki_url: config.anki_url.clone(),
        catalog: local.map(|_| catalog_path),
        notes,
        movies,
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    movies: Vec<MovieStatusJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    deck: String,
    model: String,
    anki_url: String,
    catalog: Option<String>,
    notes: usize,
    current: usize,
    modified: usize,
    missing: usize,
    orphan: usize,
}

#[derive(Serialize)]
struct MovieStatusJson {
    external_id: i64,
    note_id: Option<i64>,
    title: String,
    release_year: i32,
    clozes: usize,
    status: String,
}

fn print_json(report: StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            current: report.count(Signal::Current),
            modified: report.count(Signal::Modified),
            missing: report.count(Signal::Missing),
            orphan: report.count(Signal::Orphan),
            deck: report.deck,
            model: report.model,
            anki_url: report.anki_url,
            catalog: report.catalog.map(|p| p.display().to_string()),
            notes: report.notes,
        },
        movies: report
            .movies
            .into_iter()
            .map(|m| MovieStatusJson {
                external_id: m.external_id,
                note_id: m.note_id,
                title: m.title,
                release_year: m.release_year,
                clozes: m.clozes,
                status: signal_key(m.signal).to_string(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "tmdb")]
    external_id: i64,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "year")]
    year: String,
    #[tabled(rename = "clozes")]
    clozes: usize,
    #[tabled(rename = "note")]
    note: String,
    #[tabled(rename = "status")]
    status: String,
}

fn print_table(report: StatusReport) {
    println!(
        "Cinedeck v{} | deck '{}' ({}) | {} notes | {} modified | {} missing | {} orphan",
        env!("CARGO_PKG_VERSION"),
        report.deck,
        report.model,
        report.notes,
        report.count(Signal::Modified),
        report.count(Signal::Missing),
        report.count(Signal::Orphan),
    );
    match &report.catalog {
        Some(path) => println!("Catalog: {}", path.display()),
        None => println!("{}", "No catalog found; listing remote notes only.".yellow()),
    }

    if report.movies.is_empty() {
        println!("No movie notes in '{}'.", report.deck);
        return;
    }

    let needs_sync = report.needs_sync();
    let rows: Vec<StatusTableRow> = report
        .movies
        .into_iter()
        .map(|m| StatusTableRow {
            external_id: m.external_id,
            title: m.title,
            year: if m.release_year == 0 {
                "-".to_string()
            } else {
                m.release_year.to_string()
            },
            clozes: m.clozes,
            note: m.note_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            status: signal_label(m.signal),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if needs_sync {
        println!("Run 'cinedeck sync' to bring the deck up to date.");
    }
}

fn signal_key(signal: Signal) -> &'static str {
    match signal {
        Signal::Current => "current",
        Signal::Modified => "modified",
        Signal::Missing => "missing",
        Signal::Orphan => "orphan",
        Signal::Untracked => "untracked",
    }
}

fn signal_label(signal: Signal) -> String {
    let key = signal_key(signal).to_uppercase();
    match signal {
        Signal::Current => key.green().to_string(),
        Signal::Modified => key.yellow().to_string(),
        Signal::Missing => key.cyan().to_string(),
        Signal::Orphan => key.red().to_string(),
        Signal::Untracked => key.bright_black().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinedeck_core::{AttributeValue, NoteId};

    fn record(id: i64, title: &str) -> MovieRecord {
        let mut record = MovieRecord::new(id, title);
        record.release_year = 1995;
        record.director = vec![AttributeValue::cloze("Michael Mann")];
        record
    }

    fn stored(id: i64, title: &str, note: i64) -> MovieRecord {
        let mut record = record(id, title);
        record.remote_id = Some(NoteId(note));
        record
    }

    #[test]
    fn catalog_and_deck_are_classified() {
        let local = vec![record(1, "Heat"), record(2, "Ali"), record(3, "Thief")];
        let mut changed = stored(2, "Ali", 20);
        changed.release_year = 2001;
        let remote = vec![stored(1, "Heat", 10), changed, stored(9, "Gone", 90)];

        let report = build_report(
            &Config::default(),
            PathBuf::from("catalog.yaml"),
            Some(local.as_slice()),
            remote,
        );

        let signals: Vec<(i64, Signal)> =
            report.movies.iter().map(|m| (m.external_id, m.signal)).collect();
        assert_eq!(
            signals,
            vec![
                (1, Signal::Current),
                (2, Signal::Modified),
                (3, Signal::Missing),
                (9, Signal::Orphan),
            ]
        );
        assert_eq!(report.notes, 3);
        assert!(report.needs_sync());
    }

    #[test]
    fn without_catalog_every_note_is_untracked() {
        let report = build_report(
            &Config::default(),
            PathBuf::from("catalog.yaml"),
            None,
            vec![stored(1, "Heat", 10)],
        );
        assert_eq!(report.movies[0].signal, Signal::Untracked);
        assert_eq!(report.catalog, None);
        assert!(!report.needs_sync());
    }

    #[test]
    fn second_note_for_one_movie_is_an_orphan() {
        let local = vec![record(1, "Heat")];
        let remote = vec![stored(1, "Heat", 10), stored(1, "Heat", 11)];
        let report = build_report(&Config::default(), PathBuf::new(), Some(local.as_slice()), remote);

        assert_eq!(report.count(Signal::Orphan), 1);
        assert_eq!(report.count(Signal::Current), 1);
    }
}
