//! Views and layouts.
//!
//! # Data Flow
//! ```text
//! View { template, data, layout }
//!     → resource resolver (first module with views/<template>)
//!     → engine.rs (execute template with data)
//!     → rendered child text
//!     → layout.data[content, content_output]
//!     → layout renders (and its own layout, up the chain)
//!     → outermost text
//! ```
//!
//! # Design Decisions
//! - Reading an unset variable is NotFound; `null` counts as set
//! - A view owns its layout; the chain is rendered from the inside out
//! - Copying one view into another snapshots template and data

pub mod engine;

use std::fs;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::framework::Framework;
use crate::resource::path;
use crate::routing::Route;

pub use engine::{TemplateEngine, TeraEngine};

/// Directory, relative to a module, holding view templates.
pub const VIEWS_DIR: &str = "views";

/// Extension appended to view paths given without one.
pub const VIEW_EXTENSION: &str = ".html";

/// Layout variable holding the child view (template and data).
pub const CONTENT_KEY: &str = "content";

/// Layout variable holding the child's rendered text.
pub const CONTENT_OUTPUT_KEY: &str = "content_output";

/// Something a view can be pointed at.
#[derive(Debug, Clone, Copy)]
pub enum ViewRef<'a> {
    /// Root-relative view path, e.g. `/users/show`.
    Path(&'a str),
    /// Another view whose template and data are copied.
    View(&'a View),
}

impl<'a> From<&'a str> for ViewRef<'a> {
    fn from(path: &'a str) -> Self {
        ViewRef::Path(path)
    }
}

impl<'a> From<&'a String> for ViewRef<'a> {
    fn from(path: &'a String) -> Self {
        ViewRef::Path(path.as_str())
    }
}

impl<'a> From<&'a View> for ViewRef<'a> {
    fn from(view: &'a View) -> Self {
        ViewRef::View(view)
    }
}

/// Argument to [`View::set_layout`].
#[derive(Debug, Clone)]
pub enum Layout {
    /// Clear the current layout.
    None,
    Path(String),
    View(View),
}

impl From<View> for Layout {
    fn from(view: View) -> Self {
        Layout::View(view)
    }
}

impl From<&str> for Layout {
    fn from(path: &str) -> Self {
        if path.is_empty() {
            Layout::None
        } else {
            Layout::Path(path.to_string())
        }
    }
}

impl From<Option<View>> for Layout {
    fn from(view: Option<View>) -> Self {
        view.map_or(Layout::None, Layout::View)
    }
}

/// A template bound to data, optionally wrapped by a layout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    template: Option<String>,
    data: Map<String, Value>,
    #[serde(skip)]
    layout: Option<Box<View>>,
}

impl View {
    pub fn new<'a>(view: impl Into<ViewRef<'a>>) -> Result<Self> {
        let mut created = Self::default();
        created.set_view(view)?;
        Ok(created)
    }

    pub fn with_data<'a>(view: impl Into<ViewRef<'a>>, data: Map<String, Value>) -> Result<Self> {
        let mut created = Self::new(view)?;
        created.data.extend(data);
        Ok(created)
    }

    /// Module-relative template path, e.g. `views/users/show.html`.
    pub fn template(&self) -> Result<&str> {
        self.template
            .as_deref()
            .ok_or_else(|| Error::not_found("No view file was set"))
    }

    pub fn set_view<'a>(&mut self, view: impl Into<ViewRef<'a>>) -> Result<()> {
        match view.into() {
            ViewRef::View(other) => {
                self.template = other.template.clone();
                self.data = other.data.clone();
            }
            ViewRef::Path(raw) => {
                let mut file = raw.to_string();
                if !file.ends_with(VIEW_EXTENSION) {
                    file.push_str(VIEW_EXTENSION);
                }
                let normalized = Route::normalize(&file)?;
                self.template = Some(path::concat(&[VIEWS_DIR, normalized.as_str()]));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| Error::not_found(format!("View variable '{}' not found", key)))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value> {
        self.data
            .get_mut(key)
            .ok_or_else(|| Error::not_found(format!("View variable '{}' not found", key)))
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        Ok(serde_json::from_value(self.get(key)?.clone())?)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn set_serialized<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn layout(&self) -> Result<&View> {
        self.layout
            .as_deref()
            .ok_or_else(|| Error::not_found("View does not have a layout"))
    }

    pub fn layout_mut(&mut self) -> Result<&mut View> {
        self.layout
            .as_deref_mut()
            .ok_or_else(|| Error::not_found("View does not have a layout"))
    }

    pub fn set_layout(&mut self, layout: impl Into<Layout>) -> Result<()> {
        self.layout = match layout.into() {
            Layout::None => None,
            Layout::View(view) => Some(Box::new(view)),
            Layout::Path(path) => Some(Box::new(View::new(path.as_str())?)),
        };
        Ok(())
    }

    pub fn take_layout(&mut self) -> Option<View> {
        self.layout.take().map(|boxed| *boxed)
    }

    /// Render this view and its layout chain.
    pub fn render(&mut self, framework: &Framework) -> Result<String> {
        self.render_with(framework, None, true)
    }

    /// Render, optionally switching template first and optionally skipping
    /// the layout.
    pub fn render_with(
        &mut self,
        framework: &Framework,
        view: Option<ViewRef<'_>>,
        render_layout: bool,
    ) -> Result<String> {
        if let Some(view) = view {
            self.set_view(view)?;
        }

        let template = self.template()?.to_string();
        let file = framework
            .modules()
            .resolve(&template)
            .ok_or_else(|| Error::not_found(format!("View file '{}' does not exist", template)))?;
        let source = fs::read_to_string(&file)?;

        let output = framework
            .engine()
            .render(&template, &source, &self.data)
            .map_err(|e| Error::programmer(format!("View '{}' could not be rendered", template)).caused_by(e))?;

        if !render_layout {
            return Ok(output);
        }

        let snapshot = self.snapshot();
        match self.layout.as_deref_mut() {
            Some(layout) => {
                layout.data.insert(CONTENT_KEY.to_string(), snapshot);
                layout.data.insert(CONTENT_OUTPUT_KEY.to_string(), Value::String(output));
                layout.render(framework)
            }
            None => Ok(output),
        }
    }

    fn snapshot(&self) -> Value {
        let mut child = Map::new();
        child.insert(
            "template".to_string(),
            self.template.clone().map_or(Value::Null, Value::String),
        );
        child.insert("data".to_string(), Value::Object(self.data.clone()));
        Value::Object(child)
    }
}
