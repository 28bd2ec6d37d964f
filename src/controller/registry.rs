//! Controller registry keyed by resource path.

use std::collections::HashMap;
use std::fmt;

use crate::controller::{Controller, DynController};

/// Builds a fresh controller instance per dispatch.
pub type ControllerFactory = Box<dyn Fn() -> Box<dyn DynController> + Send + Sync>;

#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Controller + Default>(&mut self, path: &str) {
        self.register_with(path, || Box::new(C::default()) as Box<dyn DynController>);
    }

    /// Register `factory` under `path`, replacing any previous registration.
    pub fn register_with<F>(&mut self, path: &str, factory: F)
    where
        F: Fn() -> Box<dyn DynController> + Send + Sync + 'static,
    {
        let key = Self::key(path);
        if self.factories.insert(key.clone(), Box::new(factory)).is_some() {
            tracing::debug!(path = %key, "Controller registration replaced");
        }
    }

    pub fn get(&self, path: &str) -> Option<&ControllerFactory> {
        self.factories.get(&Self::key(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.factories.contains_key(&Self::key(path))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn key(path: &str) -> String {
        crate::resource::path::normalize(path)
            .trim_start_matches('/')
            .to_string()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.paths().collect();
        paths.sort_unstable();
        f.debug_struct("ControllerRegistry").field("paths", &paths).finish()
    }
}
