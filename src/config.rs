//! Run configuration: built-in defaults, then `grepomap.yaml` (or `GREPOMAP_CONFIG`),
//! then `GREPOMAP_WORLD` / `GREPOMAP_DATA_URL` overrides.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "grepomap.yaml";
pub const DEFAULT_WORLD: &str = "fr176";
pub const DEFAULT_DATA_URL: &str = "http://{world}.grepolis.com/data";
pub const DEFAULT_SHEET_PATH: &str = "temples.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Feuil1";
pub const DEFAULT_STATIC_MODULE_PATH: &str = "temples_static.js";
pub const DEFAULT_MAP_DATA_PATH: &str = "mapData.js";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: String,
    /// Base URL of the world dumps; `{world}` is substituted.
    pub data_url: String,
    pub sheet: SheetConfig,
    pub static_module: PathBuf,
    pub map_data: PathBuf,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub path: PathBuf,
    /// Worksheet name; ignored for CSV sheets.
    pub name: String,
    /// Rows skipped before data starts.
    pub header_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: DEFAULT_WORLD.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            sheet: SheetConfig::default(),
            static_module: PathBuf::from(DEFAULT_STATIC_MODULE_PATH),
            map_data: PathBuf::from(DEFAULT_MAP_DATA_PATH),
            timeout_secs: 30,
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SHEET_PATH),
            name: DEFAULT_SHEET_NAME.to_string(),
            header_rows: 1,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(path, err) => write!(f, "failed to read config {}: {err}", path.display()),
            Self::Parse(path, err) => {
                write!(f, "failed to parse config {}: {err}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Loads configuration from `GREPOMAP_CONFIG` (must exist) or `grepomap.yaml`
    /// (optional), then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("GREPOMAP_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_yaml(&raw).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn apply_env(&mut self) {
        if let Ok(world) = std::env::var("GREPOMAP_WORLD") {
            if !world.trim().is_empty() {
                self.world = world.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("GREPOMAP_DATA_URL") {
            if !url.trim().is_empty() {
                self.data_url = url.trim().to_string();
            }
        }
    }

    /// Dump base URL for the configured world, without a trailing slash.
    pub fn world_data_url(&self) -> String {
        self.data_url
            .replace("{world}", &self.world)
            .trim_end_matches('/')
            .to_string()
    }
}
