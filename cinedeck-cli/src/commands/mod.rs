//! Subcommands and the setup they share.

pub mod diff;
pub mod init;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cinedeck_anki::{AnkiClient, AnkiStore};
use cinedeck_core::{catalog, config, Config, MovieRecord};
use cinedeck_renderer::Renderer;
use cinedeck_sync::{Reconciler, Target};

/// Flags selecting the AnkiConnect endpoint and the managed deck.
///
/// Precedence: flag, then `CINEDECK_ANKI_URL`, then config file.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// AnkiConnect endpoint, e.g. http://127.0.0.1:8765.
    #[arg(long, value_name = "URL")]
    pub anki_url: Option<String>,

    /// Deck holding the movie notes.
    #[arg(long)]
    pub deck: Option<String>,

    /// Note type of the movie notes.
    #[arg(long)]
    pub model: Option<String>,
}

impl TargetArgs {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.anki_url {
            config.anki_url = url.clone();
        }
        if let Some(deck) = &self.deck {
            config.deck = deck.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config
    }
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Config file, then environment, then flags.
pub fn load_config(home: &Path, flags: &TargetArgs) -> Result<Config> {
    let config = config::load_at(home)
        .with_context(|| format!("failed to load {}", config::config_path_at(home).display()))?
        .with_env_overrides();
    Ok(flags.apply(config))
}

/// Load the catalog and turn it into records, in sync order.
pub fn load_records(
    home: &Path,
    config: &Config,
    catalog_flag: Option<&Path>,
) -> Result<(PathBuf, Vec<MovieRecord>)> {
    let path = catalog_flag
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.catalog_path_at(home));
    let catalog = catalog::load_at(&path)
        .with_context(|| format!("failed to load catalog '{}'", path.display()))?;
    let records = catalog.records();
    tracing::debug!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok((path, records))
}

/// Connect to AnkiConnect and build a reconciler for the configured target.
///
/// A real sync also creates the deck; dry runs only check the server.
pub async fn connect(
    home: &Path,
    config: &Config,
    create_deck: bool,
) -> Result<Reconciler<AnkiStore>> {
    let template_dir = config
        .template_dir
        .clone()
        .unwrap_or_else(|| config::cinedeck_dir_at(home).join("templates"));
    let renderer = Renderer::with_template_dir(Some(&template_dir))
        .with_context(|| format!("failed to load templates from '{}'", template_dir.display()))?;

    let client = AnkiClient::new(config.anki_url.clone());
    let deck = config.deck.clone();
    let client = tokio::task::spawn_blocking(move || {
        let handshake = if create_deck {
            client.bootstrap(&deck)
        } else {
            client.check_version().map(|_| ())
        };
        handshake.map(|()| client)
    })
    .await
    .context("AnkiConnect handshake was interrupted")?
    .with_context(|| format!("cannot reach AnkiConnect at {}", config.anki_url))?;

    let target = Target::new(config.deck.clone(), config.model.clone());
    Ok(Reconciler::new(AnkiStore::new(client), renderer, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_values() {
        let flags = TargetArgs {
            anki_url: Some("http://anki.local:8765".to_string()),
            deck: None,
            model: Some("Film".to_string()),
        };
        let config = flags.apply(Config::default());
        assert_eq!(config.anki_url, "http://anki.local:8765");
        assert_eq!(config.deck, "Cine2Nerdle");
        assert_eq!(config.model, "Film");
    }

    #[test]
    fn explicit_catalog_wins_over_config() {
        let home = tempfile::TempDir::new().expect("tempdir");
        let err = load_records(
            home.path(),
            &Config::default(),
            Some(Path::new("/nonexistent/catalog.yaml")),
        )
        .unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/catalog.yaml"), "got: {err}");
    }
}
