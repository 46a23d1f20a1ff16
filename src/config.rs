use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::AppSettings;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REPLY_OPTIONS: u8 = 3;
pub const DEFAULT_UPLOAD_SETTLE_MS: u64 = 2000;
/// Matches the backend's request size limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_url: Option<String>,
    pub reply_options: Option<u8>,
    pub upload_settle_ms: Option<u64>,
    pub max_upload_bytes: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            reply_options: Some(DEFAULT_REPLY_OPTIONS),
            upload_settle_ms: Some(DEFAULT_UPLOAD_SETTLE_MS),
            max_upload_bytes: Some(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl Config {
    /// `--server` wins over the file.
    pub fn server_url(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn settings(&self) -> AppSettings {
        AppSettings {
            reply_options: self.reply_options.unwrap_or(DEFAULT_REPLY_OPTIONS).max(1),
            upload_settle: Duration::from_millis(
                self.upload_settle_ms.unwrap_or(DEFAULT_UPLOAD_SETTLE_MS),
            ),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("rs_mail_assistant"))
}

pub fn default_config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    p.push("config.toml");
    Ok(p)
}

/// Load the config at `path` (or the default location). A missing file is
/// replaced by a template holding the defaults, which are then used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let sample = Config::default();
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        info!("created template config at {}", path.display());
        return Ok(sample);
    }
    let s = fs::read_to_string(&path)?;
    let cfg: Config = toml::from_str(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}
