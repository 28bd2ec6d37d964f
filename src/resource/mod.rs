//! Module registry and resource resolution.
//!
//! # Responsibilities
//! - Keep an ordered list of module directories
//! - Resolve a module-relative path to the first existing file
//! - Keep the core module at the lowest priority
//!
//! # Design Decisions
//! - Earlier registration = higher priority
//! - A higher-priority file fully shadows lower ones; content is never merged
//! - Paths are canonicalized at registration, so a missing directory fails early

pub mod path;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Reserved key of the framework's own module.
pub const CORE_MODULE_KEY: &str = "core";

/// A registered resource directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub key: String,
    pub path: PathBuf,
}

/// Ordered module list, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct Modules {
    modules: Vec<Module>,
}

impl Modules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module directory.
    ///
    /// Without a key, the directory name is used, or a numeric key when that
    /// name is already taken. An explicit key that is already registered has
    /// its path replaced in place.
    pub fn register(&mut self, dir: impl AsRef<Path>, key: Option<&str>) -> Result<&Module> {
        let dir = dir.as_ref();
        let path = std::fs::canonicalize(dir).map_err(|e| {
            Error::programmer(format!("Module directory '{}' does not exist", dir.display()))
                .caused_by(e.into())
        })?;

        let key = match key {
            Some(key) => key.to_string(),
            None => self.default_key(&path),
        };

        let index = match self.modules.iter().position(|m| m.key == key) {
            Some(index) => {
                self.modules[index].path = path;
                index
            }
            None => {
                self.modules.push(Module { key: key.clone(), path });
                self.modules.len() - 1
            }
        };

        tracing::debug!(key = %key, path = %self.modules[index].path.display(), "Module registered");

        let index = self.demote_core(index);
        Ok(&self.modules[index])
    }

    /// Register the framework's own module under [`CORE_MODULE_KEY`].
    pub fn register_core(&mut self, dir: impl AsRef<Path>) -> Result<&Module> {
        self.register(dir, Some(CORE_MODULE_KEY))
    }

    /// Path of the module registered under `key`.
    pub fn get(&self, key: &str) -> Result<&Path> {
        self.modules
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.path.as_path())
            .ok_or_else(|| Error::not_found(format!("Module '{}' not found", key)))
    }

    /// First existing `<module>/<relative>` in priority order.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        self.candidates(relative).find(|p| p.exists())
    }

    /// Like [`Modules::resolve`] but NotFound when nothing matches.
    pub fn require(&self, relative: &str) -> Result<PathBuf> {
        self.resolve(relative)
            .ok_or_else(|| Error::not_found(format!("Resource '{}' not found in any module", relative)))
    }

    /// Every `<module>/<relative>` in priority order, existing or not.
    pub fn candidates<'a>(&'a self, relative: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.modules.iter().map(move |m| {
            let base = m.path.to_string_lossy();
            PathBuf::from(path::concat(&[base.as_ref(), relative]))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn default_key(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !name.is_empty() && !self.contains_key(&name) {
            return name;
        }
        let mut n = self.modules.len();
        while self.contains_key(&n.to_string()) {
            n += 1;
        }
        n.to_string()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.modules.iter().any(|m| m.key == key)
    }

    /// Move the core module to the end; returns the new index of `tracked`.
    fn demote_core(&mut self, tracked: usize) -> usize {
        let Some(core) = self.modules.iter().position(|m| m.key == CORE_MODULE_KEY) else {
            return tracked;
        };
        let last = self.modules.len() - 1;
        if core == last {
            return tracked;
        }
        let module = self.modules.remove(core);
        self.modules.push(module);
        if tracked == core {
            last
        } else if tracked > core {
            tracked - 1
        } else {
            tracked
        }
    }
}
