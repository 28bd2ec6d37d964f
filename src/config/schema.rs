//! Typed views over the framework's own configuration keys.
//!
//! Each field is resolved through its own dotted key, so an application
//! module that sets only `main.mode` still inherits every other value from
//! the core module.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

/// Process mode, selecting how errors are rendered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Debug = 0,
    Production = 1,
}

impl From<u8> for Mode {
    fn from(val: u8) -> Self {
        match val {
            1 => Mode::Production,
            _ => Mode::Debug,
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debug" => Ok(Mode::Debug),
            "production" => Ok(Mode::Production),
            other => Err(Error::programmer(format!("Invalid mode '{}'", other))),
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: Error| serde::de::Error::custom(e.message()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Debug => f.write_str("debug"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Settings under the `main` config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MainConfig {
    /// Render mode (debug or production).
    pub mode: Mode,

    /// Output character encoding, used in the default Content-Type.
    pub encoding: String,

    /// Language tag used for string lookup.
    pub language: String,

    /// File that uncaught errors are appended to. Unset disables file logging.
    pub error_log_file: Option<PathBuf>,

    /// Domain-relative base URL of the application (e.g. `/my/app`).
    pub base_url: Option<String>,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Debug,
            encoding: "utf-8".to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            error_log_file: None,
            base_url: None,
        }
    }
}

/// Language strings fall back to.
pub const DEFAULT_LANGUAGE: &str = "en-us";

impl MainConfig {
    pub fn from_config(config: &Config<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            mode: config.get_as_or("main.mode", defaults.mode)?,
            encoding: config.get_as_or("main.encoding", defaults.encoding)?,
            language: config.get_as_or("main.language", defaults.language)?,
            error_log_file: config.get_as_or("main.error_log_file", defaults.error_log_file)?,
            base_url: config.get_as_or("main.base_url", defaults.base_url)?,
        })
    }
}

/// Settings under the `server` config file, used by the HTTP host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &Config<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: config.get_as_or("server.bind_address", defaults.bind_address)?,
            request_timeout_secs: config
                .get_as_or("server.request_timeout_secs", defaults.request_timeout_secs)?,
        })
    }
}
