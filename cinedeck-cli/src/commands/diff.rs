//! `cinedeck diff`: show unified diffs for the notes sync would change.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cinedeck_sync::{diff_records, ChangeKind};

use super::{connect, home_dir, load_config, load_records, TargetArgs};

/// Arguments for `cinedeck diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Catalog file (defaults to the configured one).
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl DiffArgs {
    pub async fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = load_config(&home, &self.target)?;
        let (_, records) = load_records(&home, &config, self.catalog.as_deref())?;
        let reconciler = connect(&home, &config, false).await?.with_dry_run(true);

        let diffs = diff_records(&reconciler, &records)
            .await
            .with_context(|| format!("diff failed for deck '{}'", config.deck))?;

        if diffs.is_empty() {
            println!("No differences for '{}'.", config.deck);
            return Ok(());
        }

        for diff in diffs {
            let kind = match diff.kind {
                ChangeKind::Create => "create".green(),
                ChangeKind::Update => "update".yellow(),
            };
            println!("{} {} ({})", kind.bold(), diff.title, diff.external_id);
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
