use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use store::StoreConfig;
use url::Url;

pub const APP_NAME: &str = "sharebox";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const OBJECTS_DIR_NAME: &str = "objects";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Externally reachable base URL of the daemon, used for proxied
    /// download links. Defaults to `http://localhost:<api_port>`.
    #[serde(default)]
    pub public_url: Option<Url>,
    /// Default log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Object storage backend
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_api_port() -> u16 {
    5555
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            public_url: None,
            log_level: default_log_level(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the sharebox directory (~/.sharebox)
    pub sharebox_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the sharebox directory path (custom or default ~/.sharebox)
    pub fn sharebox_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Default location of the local object store inside the sharebox directory.
    pub fn objects_dir(sharebox_dir: &std::path::Path) -> PathBuf {
        sharebox_dir.join(OBJECTS_DIR_NAME)
    }

    /// Initialize a new sharebox state directory
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let sharebox_dir = Self::sharebox_dir(custom_path)?;

        if sharebox_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&sharebox_dir)?;

        let config = config.unwrap_or_default();
        let config_path = sharebox_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            sharebox_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the sharebox directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let sharebox_dir = Self::sharebox_dir(custom_path)?;

        if !sharebox_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = sharebox_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            sharebox_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sharebox directory not initialized. Run 'sharebox init' first")]
    NotInitialized,

    #[error("sharebox directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
