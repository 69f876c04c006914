//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON database file.
    pub database_path: PathBuf,
    /// Editor command for `gott edit`; falls back to `$VISUAL`, `$EDITOR`, then `vi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("db.json"),
            editor: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default locations, then `config_path`,
    /// then `GOTT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (GOTT_*)
        figment = figment.merge(Env::prefixed("GOTT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for gott.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gott"))
}

/// Returns the platform-specific data directory for gott.
///
/// On Linux: `~/.local/share/gott`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gott"))
}
