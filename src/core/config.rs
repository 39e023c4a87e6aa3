//! Runtime configuration
//!
//! The bot is configured by a single JSON file passed with `--config`.
//! Any key can be overridden from the environment with the `SPIKE_` prefix,
//! nested keys are separated by a double underscore
//! (`SPIKE_YADISK__ROOT_DIR=/Photos`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Json};
use figment::Figment;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::core::error::{AppError, AppResult};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SPIKE_";

/// Default Yandex.Disk REST endpoint
pub const DEFAULT_YADISK_API_URL: &str = "https://cloud-api.yandex.net/v1/disk";

/// Width of the zero-padded message id in generated file names
pub const ID_SIZE: usize = 10;

/// Top-level bot configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token
    pub telegram_token: SecretString,
    /// Local working directory: scratch files, database and log live here
    pub workdir: PathBuf,
    /// Database file name, relative to `workdir`
    #[serde(default = "default_database")]
    pub database: String,
    /// Log file name, relative to `workdir`
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Prefix generated file names with the chat id.
    ///
    /// Message ids are only unique within a chat, so without the prefix two
    /// chats mapping tags to the same category can collide on a file name.
    #[serde(default = "default_true")]
    pub prefix_chat_id: bool,
    /// Remote storage settings
    pub yadisk: YaDiskConfig,
}

/// Yandex.Disk settings
#[derive(Debug, Deserialize)]
pub struct YaDiskConfig {
    /// OAuth token
    pub token: SecretString,
    /// Remote directory every category lives under
    pub root_dir: String,
    /// Public URL of `root_dir`, used to build links to saved photos
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database() -> String {
    "spike.sqlite".to_string()
}

fn default_log_file() -> String {
    "spike.log".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_YADISK_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl AppConfig {
    /// Loads the config file at `path` and applies environment overrides.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::Config(format!("config file not found: {}", path.display())));
        }

        let config: AppConfig = Figment::new()
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config from a JSON string, without environment overrides.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: AppConfig = Figment::from(Json::string(json)).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.telegram_token.expose_secret().trim().is_empty() {
            return Err(AppError::Validation("telegram_token must not be empty".to_string()));
        }
        if self.yadisk.token.expose_secret().trim().is_empty() {
            return Err(AppError::Validation("yadisk.token must not be empty".to_string()));
        }
        if self.yadisk.timeout_secs == 0 {
            return Err(AppError::Validation("yadisk.timeout_secs must be positive".to_string()));
        }
        url::Url::parse(&self.yadisk.api_url)
            .map_err(|e| AppError::Validation(format!("invalid yadisk.api_url: {}", e)))?;
        Ok(())
    }

    /// Creates the working directory if it does not exist yet.
    pub fn prepare_workdir(&self) -> AppResult<()> {
        fs_err::create_dir_all(&self.workdir)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.workdir.join(&self.database)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.workdir.join(&self.log_file)
    }
}

impl YaDiskConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
