use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use inventory_engine::DEFAULT_DATABASE;
use serde::Deserialize;

/// Optional settings file read from the working directory.
const CONFIG_FILE: &str = "ingest.toml";

const ENV_DATA_DIR: &str = "INGEST_DATA_DIR";
const ENV_DATABASE: &str = "INGEST_DATABASE";
const ENV_LOG_FILE: &str = "INGEST_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory scanned for `*.csv` files.
    pub data_dir: PathBuf,
    /// Connection string of the target database.
    pub database: String,
    /// Run log, opened in append mode.
    pub log_file: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database: DEFAULT_DATABASE.to_string(),
            log_file: PathBuf::from("logs/ingestion_db.log"),
            log_filter: "debug".to_string(),
        }
    }
}

impl IngestConfig {
    /// Defaults, then `ingest.toml` if present, then `.env` and the process
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file_if_exists(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file_if_exists(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = present(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = present(ENV_DATABASE) {
            self.database = value;
        }
        if let Some(value) = present(ENV_LOG_FILE) {
            self.log_file = PathBuf::from(value);
        }
    }
}
