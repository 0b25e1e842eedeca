use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::pipeline::CleaningConfig;

/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "campaign-lens.json";

/// Overrides `data_path` when set.
pub const DATA_PATH_ENV: &str = "CAMPAIGN_LENS_DATA";

const DEFAULT_DATA_PATH: &str = "marketing_campaign_data.csv";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at start-up.
    pub data_path: PathBuf,
    pub cleaning: CleaningConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then [`CONFIG_FILE`] if present, then the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?.unwrap_or_default();
        if let Some(path) = std::env::var_os(DATA_PATH_ENV) {
            config.data_path = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Read a JSON settings file; `Ok(None)` when it does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(Some(config))
    }
}
