//! `cinedeck sync`: reconcile the deck with the catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cinedeck_sync::{run_batch, BatchReport, GcStatus, UpsertResult};

use super::{connect, home_dir, load_config, load_records, TargetArgs};

/// Arguments for `cinedeck sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Catalog file (defaults to the configured one).
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Upserts allowed in flight at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Query and compare only; create, update and delete nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub async fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = load_config(&home, &self.target)?;
        let (catalog_path, records) = load_records(&home, &config, self.catalog.as_deref())?;
        if records.is_empty() {
            tracing::warn!(
                catalog = %catalog_path.display(),
                "catalog selects no movies; every managed note is stale"
            );
        }

        let concurrency = self.concurrency.unwrap_or(config.concurrency);
        let reconciler = connect(&home, &config, !self.dry_run)
            .await?
            .with_dry_run(self.dry_run);

        let report = run_batch(Arc::new(reconciler), records, concurrency).await;
        print_report(&config.deck, &report, self.dry_run);

        match report.into_error() {
            Some(err) => Err(err).with_context(|| format!("sync failed for deck '{}'", config.deck)),
            None => Ok(()),
        }
    }
}

fn print_report(deck: &str, report: &BatchReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let created = report.count(|r| {
        matches!(
            r,
            UpsertResult::Created { .. } | UpsertResult::WouldCreate
        )
    });
    let updated = report.count(|r| {
        matches!(
            r,
            UpsertResult::Updated { .. } | UpsertResult::WouldUpdate { .. }
        )
    });
    let unchanged = report.count(|r| matches!(r, UpsertResult::Unchanged { .. }));
    let deleted = report.deleted().len();
    let seconds = report.elapsed().num_milliseconds() as f64 / 1000.0;

    if report.is_success() {
        println!(
            "{prefix}✓ '{deck}' synced ({created} created, {updated} updated, {unchanged} unchanged, {deleted} deleted) in {seconds:.1}s"
        );
    } else {
        println!(
            "{prefix}{} '{deck}' partially synced ({created} created, {updated} updated, {unchanged} unchanged, {} failed)",
            "✗".red(),
            report.failures.len()
        );
    }

    for outcome in &report.outcomes {
        let label = format!("{} ({})", outcome.title, outcome.external_id);
        match &outcome.result {
            UpsertResult::Created { id, attempts } if *attempts > 1 => {
                println!("  +  {label} → {id} after {attempts} attempts")
            }
            UpsertResult::Created { id, .. } => println!("  +  {label} → {id}"),
            UpsertResult::WouldCreate => println!("  +  {label}"),
            UpsertResult::Updated { id } | UpsertResult::WouldUpdate { id } => {
                println!("  ✎  {label} → {id}")
            }
            UpsertResult::Unchanged { .. } => {}
        }
    }

    match &report.gc {
        GcStatus::Completed(gc) => {
            for id in &gc.deleted {
                println!("  -  note {id}");
            }
        }
        GcStatus::Skipped => println!(
            "  {} garbage collection skipped after failed upserts",
            "!".yellow()
        ),
        GcStatus::Failed(err) => println!("  {} garbage collection failed: {err}", "✗".red()),
    }

    for failure in &report.failures {
        println!("  {}  {failure}", "✗".red());
    }
}
