//! Runtime configuration, read from the environment

use crate::admins::parse_user_id;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// File names inside the data directory
pub const CATALOG_FILE: &str = "catalog_data.json";
pub const MOVED_FILE: &str = "moved_items.json";
pub const MANUAL_FILE: &str = "manual_categories.json";
pub const ADMINS_FILE: &str = "admins.json";
pub const LATEST_SPREADSHEET_FILE: &str = "latest_catalog.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the JSON mirrors (env: CATALOG_DATA_DIR)
    pub data_dir: PathBuf,
    /// HTTP API port (env: CATALOG_HTTP_PORT)
    pub http_port: u16,
    /// Administrators always present (env: CATALOG_ADMIN_IDS, comma separated)
    pub seed_admins: Vec<i64>,
    /// Imports update unlocked manual prices (env: CATALOG_SYNC_MANUAL_PRICES)
    pub sync_manual_prices: bool,
}

impl Config {
    /// Defaults rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            data_dir: data_dir.into(),
            http_port: DEFAULT_HTTP_PORT,
            seed_admins: Vec::new(),
            sync_manual_prices: true,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("CATALOG_DATA_DIR").unwrap_or_else(|_| ".".into());

        let http_port = match std::env::var("CATALOG_HTTP_PORT") {
            Ok(port) => port
                .trim()
                .parse()
                .with_context(|| format!("CATALOG_HTTP_PORT is not a port number: {port:?}"))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let seed_admins = match std::env::var("CATALOG_ADMIN_IDS") {
            Ok(ids) => parse_admin_ids(&ids).context("CATALOG_ADMIN_IDS is invalid")?,
            Err(_) => Vec::new(),
        };

        let sync_manual_prices = std::env::var("CATALOG_SYNC_MANUAL_PRICES")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Config {
            data_dir: PathBuf::from(data_dir),
            http_port,
            seed_admins,
            sync_manual_prices,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
    }
}

/// Comma separated numeric ids; blanks are ignored
pub fn parse_admin_ids(text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| parse_user_id(id).map_err(Into::into))
        .collect()
}

/// Anything but an explicit "off" value counts as on
fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Where each persisted document lives
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub catalog: PathBuf,
    pub moved: PathBuf,
    pub manual: PathBuf,
    pub admins: PathBuf,
    pub latest_spreadsheet: PathBuf,
}

impl DataPaths {
    pub fn new(dir: &Path) -> Self {
        DataPaths {
            catalog: dir.join(CATALOG_FILE),
            moved: dir.join(MOVED_FILE),
            manual: dir.join(MANUAL_FILE),
            admins: dir.join(ADMINS_FILE),
            latest_spreadsheet: dir.join(LATEST_SPREADSHEET_FILE),
        }
    }
}
