//! Loading service configuration (board pool + dataset inventory) from TOML.
//!
//! See `AppConfig` for the expected schema. Everything is optional; built-in
//! defaults from `seeds` keep the service useful without any config file.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub board: Option<BoardConfig>,
  #[serde(default)]
  pub datasets: Vec<DatasetCfg>,
}

/// AAC board pool override. Categories are ordered; concepts keep their
/// listed order before the seeded shuffle.
#[derive(Clone, Debug, Deserialize)]
pub struct BoardConfig {
  #[serde(default)] pub image_base_url: Option<String>,
  #[serde(default)] pub categories: Vec<BoardCategory>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BoardCategory {
  pub name: String,
  pub concepts: Vec<String>,
}

/// One dataset in the inventory. With a `source_url` the refresh task
/// pulls rows from it; without one the builtin demo rows apply.
#[derive(Clone, Debug, Deserialize)]
pub struct DatasetCfg {
  pub name: String,
  #[serde(default)] pub source_url: Option<String>,
}

/// Dataset names from SAARTHI_DATASETS (comma-separated), used when the
/// TOML config lists none.
pub fn datasets_from_env() -> Vec<DatasetCfg> {
  std::env::var("SAARTHI_DATASETS")
    .unwrap_or_default()
    .split(',')
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(|n| DatasetCfg { name: n.to_string(), source_url: None })
    .collect()
}

/// Attempt to load `AppConfig` from SAARTHI_CONFIG_PATH. On any parsing/IO
/// error, returns None and the defaults apply.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("SAARTHI_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "saarthi_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "saarthi_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "saarthi_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
