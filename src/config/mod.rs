//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! key "file.index1.index2"
//!     → modules in priority order
//!     → loader.rs (parse <module>/config/file.toml)
//!     → drill into [index1][index2]
//!     → first module that has the item wins
//!     → schema.rs (typed MainConfig / ServerConfig)
//!     → validation.rs (semantic checks)
//! ```
//!
//! # Design Decisions
//! - A module whose file lacks the item does not end the search
//! - Framework settings are read once when the Framework is built
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::resource::Modules;

pub use loader::{ResourceLoader, TomlLoader};
pub use schema::{MainConfig, Mode, ServerConfig};

/// Directory, relative to a module, holding config files.
pub const CONFIG_DIR: &str = "config";

/// Dotted-key config lookup over a module list.
#[derive(Debug, Clone, Copy)]
pub struct Config<'a> {
    modules: &'a Modules,
    loader: &'a dyn ResourceLoader,
}

impl<'a> Config<'a> {
    pub fn new(modules: &'a Modules, loader: &'a dyn ResourceLoader) -> Self {
        Self { modules, loader }
    }

    /// Look up `key`, or None when no module has it.
    pub fn lookup(&self, key: &str) -> Result<Option<toml::Value>> {
        let mut parts = key.split('.');
        let file = parts.next().unwrap_or_default();
        if file.is_empty() {
            return Err(Error::programmer(format!("Invalid config key '{}'", key)));
        }
        let indices: Vec<&str> = parts.collect();
        loader::find_item(self.modules, self.loader, CONFIG_DIR, file, &indices)
    }

    /// Look up `key`; NotFound when absent.
    pub fn get(&self, key: &str) -> Result<toml::Value> {
        self.lookup(key)?
            .ok_or_else(|| Error::not_found(format!("Config item '{}' does not exist", key)))
    }

    /// Look up `key`, falling back to `default` when absent.
    pub fn get_or(&self, key: &str, default: toml::Value) -> Result<toml::Value> {
        Ok(self.lookup(key)?.unwrap_or(default))
    }

    /// Look up and deserialize `key`; NotFound when absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        Self::convert(key, self.get(key)?)
    }

    /// Look up and deserialize `key`, falling back to `default` when absent.
    pub fn get_as_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.lookup(key)? {
            Some(value) => Self::convert(key, value),
            None => Ok(default),
        }
    }

    /// Look up a string item.
    pub fn get_str(&self, key: &str) -> Result<String> {
        self.get_as(key)
    }

    fn convert<T: DeserializeOwned>(key: &str, value: toml::Value) -> Result<T> {
        value.try_into().map_err(|e: toml::de::Error| {
            Error::programmer(format!("Config item '{}' has an unexpected type", key)).caused_by(e.into())
        })
    }
}
