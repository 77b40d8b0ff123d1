//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Name of the sheet holding the range inputs and the report.
    pub sheet: String,

    /// Calendar to query and to import into. `None` queries every calendar.
    #[serde(default)]
    pub calendar_id: Option<String>,

    /// Creators pinned to the front of the matrix header, in this order.
    #[serde(default)]
    pub primary_creators: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("sheet", &self.sheet)
            .field("calendar_id", &self.calendar_id)
            .field("primary_creators", &self.primary_creators.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ic.db"),
            sheet: "counts".to_string(),
            calendar_id: None,
            primary_creators: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
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

        // Load from environment variables (IC_*)
        figment = figment.merge(Env::prefixed("IC_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for ic.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ic"))
}

/// Returns the platform-specific data directory for ic.
///
/// On Linux: `~/.local/share/ic`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ic"))
}
