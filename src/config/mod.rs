//! Typed configuration from environment variables and an optional TOML file.
//!
//! Loads once at startup, fails fast on malformed values. Environment
//! variables take precedence over the file. The API key is wrapped in
//! secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DATA_DIR: &str = ".voxmind";

#[derive(Debug)]
pub struct Config {
    pub gemini_api_key: Option<SecretString>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub data_dir: PathBuf,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

/// On-disk layout of `voxmind.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    gateway: GatewaySection,
    storage: StorageSection,
    telemetry: TelemetrySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GatewaySection {
    api_key: Option<String>,
    model: Option<String>,
    api_base: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TelemetrySection {
    otel_endpoint: Option<String>,
    log_level: Option<String>,
}

impl Config {
    /// Load configuration from environment variables only.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(None, |name| std::env::var(name).ok())
    }

    /// Load configuration from an optional TOML file, overridden by
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read config file {}: {e}", path.display()))
            })?),
            None => None,
        };
        Self::from_vars(file.as_deref(), |name| std::env::var(name).ok())
    }

    /// Build a config from TOML text and a variable lookup.
    pub fn from_vars<F>(toml_text: Option<&str>, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match toml_text {
            Some(text) => toml::from_str(text)
                .map_err(|e| Error::Config(format!("bad config file: {e}")))?,
            None => FileConfig::default(),
        };

        let gemini_api_key = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .filter(|key| !key.is_empty())
            .map(SecretString::from)
            .or_else(|| file.gateway.api_key.map(SecretString::from));

        let timeout_secs = match var("VOXMIND_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("VOXMIND_TIMEOUT_SECS must be a number, got {raw:?}"))
            })?,
            None => file.gateway.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(Error::Config("gateway timeout must be positive".to_string()));
        }

        Ok(Self {
            gemini_api_key,
            model: var("VOXMIND_MODEL")
                .or(file.gateway.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: var("VOXMIND_API_BASE")
                .or(file.gateway.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout_secs,
            data_dir: var("VOXMIND_DATA_DIR")
                .map(PathBuf::from)
                .or(file.storage.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            otel_endpoint: var("OTEL_ENDPOINT").or(file.telemetry.otel_endpoint),
            log_level: var("LOG_LEVEL")
                .or(file.telemetry.log_level)
                .unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The gateway API key, required by every capture command.
    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.gemini_api_key.as_ref().ok_or_else(|| {
            Error::Config("required environment variable GEMINI_API_KEY is not set".to_string())
        })
    }
}
