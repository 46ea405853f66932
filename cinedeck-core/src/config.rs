//! User configuration at `~/.cinedeck/config.yaml`.
//!
//! # Storage layout
//!
//! ```text
//! ~/.cinedeck/            (mode 0700)
//!   config.yaml           (mode 0600)
//!   catalog.yaml          (default catalog location)
//!   templates/            (optional Tera overrides)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding [`Config::anki_url`].
pub const ENV_ANKI_URL: &str = "CINEDECK_ANKI_URL";

pub const DEFAULT_ANKI_URL: &str = "http://127.0.0.1:8765";
pub const DEFAULT_DECK: &str = "Cine2Nerdle";
pub const DEFAULT_MODEL: &str = "Movie";
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AnkiConnect endpoint.
    pub anki_url: String,
    pub deck: String,
    /// Note type every movie note uses.
    pub model: String,
    /// Upserts allowed in flight at once.
    pub concurrency: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anki_url: DEFAULT_ANKI_URL.to_string(),
            deck: DEFAULT_DECK.to_string(),
            model: DEFAULT_MODEL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            catalog: None,
            template_dir: None,
        }
    }
}

impl Config {
    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_ANKI_URL).filter(|u| !u.trim().is_empty()) {
            self.anki_url = url;
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Configured catalog, or `<home>/.cinedeck/catalog.yaml`.
    pub fn catalog_path_at(&self, home: &Path) -> PathBuf {
        self.catalog
            .clone()
            .unwrap_or_else(|| cinedeck_dir_at(home).join("catalog.yaml"))
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.cinedeck/`
pub fn cinedeck_dir_at(home: &Path) -> PathBuf {
    home.join(".cinedeck")
}

/// `<home>/.cinedeck/config.yaml`
pub fn config_path_at(home: &Path) -> PathBuf {
    cinedeck_dir_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load / save
// ---------------------------------------------------------------------------

/// Load the config; a missing file yields defaults.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = cinedeck_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    let tmp_path = path.with_file_name("config.yaml.tmp");
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(path)
}

pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

/// Write a default config unless one exists.
///
/// Idempotent: an existing file is loaded and returned unchanged. The bool is
/// `true` when a new file was written.
pub fn init_at(home: &Path) -> Result<(Config, bool), ConfigError> {
    if config_path_at(home).exists() {
        return Ok((load_at(home)?, false));
    }
    let config = Config::default();
    save_at(home, &config)?;
    Ok((config, true))
}

pub fn init() -> Result<(Config, bool), ConfigError> {
    init_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let home = TempDir::new().unwrap();
        let config = load_at(home.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.deck, "Cine2Nerdle");
        assert_eq!(config.concurrency, 5);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(cinedeck_dir_at(home.path())).unwrap();
        std::fs::write(config_path_at(home.path()), "deck: Films\nconcurrency: 2\n").unwrap();
        let config = load_at(home.path()).unwrap();
        assert_eq!(config.deck, "Films");
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn malformed_config_reports_path() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(cinedeck_dir_at(home.path())).unwrap();
        std::fs::write(config_path_at(home.path()), "concurrency: [nope").unwrap();
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn init_is_idempotent_and_atomic() {
        let home = TempDir::new().unwrap();
        let (_, created) = init_at(home.path()).unwrap();
        assert!(created);
        assert!(!config_path_at(home.path())
            .with_file_name("config.yaml.tmp")
            .exists());

        let mut edited = Config::default();
        edited.deck = "Mine".into();
        save_at(home.path(), &edited).unwrap();
        let (loaded, created) = init_at(home.path()).unwrap();
        assert!(!created);
        assert_eq!(loaded.deck, "Mine");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(config_path_at(home.path()))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn env_override_replaces_anki_url() {
        let config = Config::default().apply_env(|key| {
            (key == ENV_ANKI_URL).then(|| "http://anki.local:9000".to_string())
        });
        assert_eq!(config.anki_url, "http://anki.local:9000");

        let blank = Config::default().apply_env(|_| Some("  ".to_string()));
        assert_eq!(blank.anki_url, DEFAULT_ANKI_URL);
    }

    #[test]
    fn catalog_path_defaults_under_cinedeck_dir() {
        let home = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(
            config.catalog_path_at(home.path()),
            home.path().join(".cinedeck").join("catalog.yaml")
        );
    }
}
