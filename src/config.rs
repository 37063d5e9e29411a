/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load and validate Partinfo-Core configuration from TOML,
    falling back to conservative defaults.

  Security / Safety Notes:
    Credentials may be stored in the config file; they are
    never logged and Debug output redacts the password.

  Dependencies:
    toml + serde for parsing, dirs for XDG path resolution.

  Operational Scope:
    Read once at startup by the binary entry point.

  Revision History:
    2026-10-19 COD  Authored configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit paths must exist; implicit paths may be absent
    - Defaults are safe and local-only
============================================================*/

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PartinfoError, Result};

const APP_DIR: &str = "partinfo";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartinfoConfig {
    pub general: GeneralConfig,
    pub client: ClientConfig,
}

/// Paths used by the CLI for logs and reports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

/// HTTP client settings for the partition endpoint.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Retries after the first attempt on 429 and 5xx responses.
    pub max_retries: usize,
    pub max_parallel_requests: usize,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5984".to_string(),
            timeout: 30,
            max_retries: 3,
            max_parallel_requests: 4,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_parallel_requests", &self.max_parallel_requests)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PartinfoConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file yields built-in defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            PartinfoError::Config(format!(
                "Failed to read config file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw).map_err(|err| match err {
            PartinfoError::Config(message) => {
                PartinfoError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|err| PartinfoError::Config(format!("Invalid TOML: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = self.client.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PartinfoError::Config(format!(
                "client.base_url must be an http(s) URL, got `{url}`"
            )));
        }
        if self.client.password.is_some() && self.client.username.is_none() {
            return Err(PartinfoError::Config(
                "client.password is set but client.username is missing".into(),
            ));
        }
        Ok(())
    }

    /// Directory for session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.general.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("logs")
        })
    }

    /// Default destination for persisted reports.
    pub fn report_path(&self) -> PathBuf {
        self.general.report_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("report.json")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
