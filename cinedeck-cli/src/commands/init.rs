//! `cinedeck init`: write a default config unless one exists.

use anyhow::{Context, Result};
use clap::Args;

use cinedeck_core::config;

use super::home_dir;

/// Create ~/.cinedeck/config.yaml with default settings.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let (config, created) = config::init_at(&home).context("failed to initialise config")?;
        let path = config::config_path_at(&home);

        if created {
            println!("✓ Wrote default config to {}", path.display());
        } else {
            println!("✓ Config already exists at {}", path.display());
        }
        println!("  AnkiConnect: {}", config.anki_url);
        println!("  Deck:        {}", config.deck);
        println!("  Note type:   {}", config.model);
        println!(
            "  Catalog:     {}",
            config.catalog_path_at(&home).display()
        );
        Ok(())
    }
}
