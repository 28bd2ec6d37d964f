//! Framework assembly.
//!
//! # Responsibilities
//! - Register modules (core last) and read framework settings once
//! - Own the resource loader, template engine and controller registry
//! - Hold the process mode, switchable at runtime
//!
//! # Design Decisions
//! - Immutable after `build()` apart from the mode cell; shared as `Arc<Framework>`
//! - Per-request state lives in `request::Worker`, never here
//! - Controller lookup goes through a pluggable class-name mapping

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::config::validation::{into_error, validate_main};
use crate::config::{Config, MainConfig, Mode, ResourceLoader, TomlLoader};
use crate::controller::registry::{ControllerFactory, ControllerRegistry};
use crate::controller::{Controller, DynController};
use crate::error::{Error, Result};
use crate::resource::Modules;
use crate::routing::RerouteTable;
use crate::strings::Strings;
use crate::view::{TemplateEngine, TeraEngine};

/// Maps a controller class name (e.g. `Users_Controller`) to the resource
/// path it is registered under (e.g. `controller/users`).
pub type ClassNameToPath = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Directory of the built-in core module shipped with the crate.
pub const DEFAULT_CORE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/core");

/// `Users_Controller` → `controller/users`, `Admin_Users_Controller` →
/// `controller/users/admin`.
pub fn default_class_name_to_path(class_name: &str) -> String {
    class_name
        .split('_')
        .rev()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("/")
}

pub struct Framework {
    modules: Modules,
    loader: Box<dyn ResourceLoader>,
    engine: Box<dyn TemplateEngine>,
    controllers: ControllerRegistry,
    class_name_to_path: Option<ClassNameToPath>,
    reroutes: RerouteTable,
    settings: MainConfig,
    mode: AtomicU8,
}

impl Framework {
    pub fn builder() -> FrameworkBuilder {
        FrameworkBuilder::new()
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    pub fn config(&self) -> Config<'_> {
        Config::new(&self.modules, self.loader.as_ref())
    }

    pub fn strings(&self) -> Strings<'_> {
        Strings::new(&self.modules, self.loader.as_ref(), &self.settings.language)
    }

    pub fn string(&self, key: &str, args: &[&dyn fmt::Display]) -> Result<String> {
        self.strings().get(key, args)
    }

    pub fn engine(&self) -> &dyn TemplateEngine {
        self.engine.as_ref()
    }

    pub fn reroutes(&self) -> &RerouteTable {
        &self.reroutes
    }

    /// Settings read from `main.*` at build time.
    pub fn settings(&self) -> &MainConfig {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        Mode::from(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: Mode) {
        let previous = self.mode.swap(mode as u8, Ordering::Relaxed);
        if previous != mode as u8 {
            tracing::info!(mode = %mode, "Framework mode changed");
        }
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Factory of the controller class `class_name`, or None when no
    /// controller is registered at its path.
    pub fn find_controller(&self, class_name: &str) -> Result<Option<&ControllerFactory>> {
        let map = self
            .class_name_to_path
            .as_ref()
            .ok_or_else(|| Error::programmer("No class name to path mapping is set"))?;
        let path = map(class_name);
        if path.trim_matches('/').is_empty() {
            return Err(Error::programmer(format!(
                "Class name '{}' maps to an empty path",
                class_name
            )));
        }
        Ok(self.controllers.get(&path))
    }
}

impl fmt::Debug for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framework")
            .field("modules", &self.modules)
            .field("loader", &self.loader)
            .field("engine", &self.engine)
            .field("controllers", &self.controllers)
            .field("class_name_to_path", &self.class_name_to_path.is_some())
            .field("reroutes", &self.reroutes.len())
            .field("settings", &self.settings)
            .field("mode", &self.mode())
            .finish()
    }
}

/// Step-by-step construction of a [`Framework`].
pub struct FrameworkBuilder {
    core_dir: Option<PathBuf>,
    modules: Vec<(PathBuf, Option<String>)>,
    loader: Box<dyn ResourceLoader>,
    engine: Box<dyn TemplateEngine>,
    controllers: ControllerRegistry,
    class_name_to_path: Option<ClassNameToPath>,
    mode: Option<Mode>,
}

impl Default for FrameworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkBuilder {
    pub fn new() -> Self {
        Self {
            core_dir: Some(PathBuf::from(DEFAULT_CORE_DIR)),
            modules: Vec::new(),
            loader: Box::new(TomlLoader),
            engine: Box::new(TeraEngine),
            controllers: ControllerRegistry::new(),
            class_name_to_path: Some(Arc::new(default_class_name_to_path)),
            mode: None,
        }
    }

    /// Use `dir` as the core module instead of the bundled one.
    pub fn core_module(mut self, dir: impl AsRef<Path>) -> Self {
        self.core_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Build without a core module.
    pub fn without_core_module(mut self) -> Self {
        self.core_dir = None;
        self
    }

    /// Add an application module. Earlier modules take precedence.
    pub fn module(mut self, dir: impl AsRef<Path>) -> Self {
        self.modules.push((dir.as_ref().to_path_buf(), None));
        self
    }

    pub fn module_with_key(mut self, dir: impl AsRef<Path>, key: &str) -> Self {
        self.modules.push((dir.as_ref().to_path_buf(), Some(key.to_string())));
        self
    }

    pub fn loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn class_name_to_path<F>(mut self, map: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.class_name_to_path = Some(Arc::new(map));
        self
    }

    /// Remove the class-name mapping; every dispatch then fails.
    pub fn without_class_name_to_path(mut self) -> Self {
        self.class_name_to_path = None;
        self
    }

    /// Register `C` under resource path `path` (e.g. `controller/users`).
    pub fn controller<C: Controller + Default>(mut self, path: &str) -> Self {
        self.controllers.register::<C>(path);
        self
    }

    pub fn controller_with<F>(mut self, path: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn DynController> + Send + Sync + 'static,
    {
        self.controllers.register_with(path, factory);
        self
    }

    /// Override `main.mode`.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<Framework> {
        let mut modules = Modules::new();
        if let Some(core) = &self.core_dir {
            modules.register_core(core)?;
        }
        for (dir, key) in &self.modules {
            modules.register(dir, key.as_deref())?;
        }

        let (settings, reroutes) = {
            let config = Config::new(&modules, self.loader.as_ref());
            let settings = MainConfig::from_config(&config)?;
            validate_main(&settings).map_err(into_error)?;
            let reroutes = RerouteTable::from_config(&config)?;
            (settings, reroutes)
        };

        let mode = self.mode.unwrap_or(settings.mode);

        tracing::info!(
            modules = modules.len(),
            controllers = self.controllers.len(),
            reroutes = reroutes.len(),
            mode = %mode,
            language = %settings.language,
            "Framework built"
        );

        Ok(Framework {
            modules,
            loader: self.loader,
            engine: self.engine,
            controllers: self.controllers,
            class_name_to_path: self.class_name_to_path,
            reroutes,
            settings,
            mode: AtomicU8::new(mode as u8),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_class_name_to_path() {
        assert_eq!(default_class_name_to_path("Users_Controller"), "controller/users");
        assert_eq!(
            default_class_name_to_path("Admin_Users_Controller"),
            "controller/users/admin"
        );
    }

    #[test]
    fn test_build_reads_settings() {
        let root = TempDir::new().unwrap();
        let config = root.path().join("app/config");
        fs::create_dir_all(&config).unwrap();
        fs::write(
            config.join("main.toml"),
            "mode = \"production\"\nlanguage = \"nl\"\nbase_url = \"/shop\"\n",
        )
        .unwrap();
        fs::write(config.join("routes.toml"), "[routes]\n\"/home\" = \"/pages/index\"\n").unwrap();

        let fw = Framework::builder().module(root.path().join("app")).build().unwrap();

        assert_eq!(fw.mode(), Mode::Production);
        assert_eq!(fw.settings().language, "nl");
        assert_eq!(fw.settings().encoding, "utf-8");
        assert_eq!(fw.reroutes().len(), 1);
        assert_eq!(fw.modules().iter().last().unwrap().key, "core");

        fw.set_mode(Mode::Debug);
        assert_eq!(fw.mode(), Mode::Debug);
    }

    #[test]
    fn test_invalid_settings_fail_build() {
        let root = TempDir::new().unwrap();
        let config = root.path().join("app/config");
        fs::create_dir_all(&config).unwrap();
        fs::write(config.join("main.toml"), "mode = \"loud\"\n").unwrap();

        let err = Framework::builder().module(root.path().join("app")).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Programmer);

        fs::write(config.join("main.toml"), "base_url = \"shop\"\n").unwrap();
        let err = Framework::builder().module(root.path().join("app")).build().unwrap_err();
        assert!(err.message().contains("base_url"));
    }

    #[test]
    fn test_missing_mapping_is_programmer_error() {
        let fw = Framework::builder().without_class_name_to_path().build().unwrap();
        let err = fw.find_controller("Users_Controller").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Programmer);

        let fw = Framework::builder().class_name_to_path(|_| String::new()).build().unwrap();
        assert!(fw.find_controller("Users_Controller").is_err());
    }
}
