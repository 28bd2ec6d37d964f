//! Template execution.
//!
//! The view layer only needs "source + named values → text"; the concrete
//! template syntax lives behind [`TemplateEngine`].

use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub trait TemplateEngine: Send + Sync + std::fmt::Debug {
    /// Execute `source` (read from `name`) with `data` exposed as named values.
    fn render(&self, name: &str, source: &str, data: &Map<String, Value>) -> Result<String>;
}

/// Tera-backed engine. Autoescaping is off; templates escape explicitly with
/// the `escape` filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine;

impl TemplateEngine for TeraEngine {
    fn render(&self, name: &str, source: &str, data: &Map<String, Value>) -> Result<String> {
        let context = tera::Context::from_serialize(data)?;
        tera::Tera::one_off(source, &context, false).map_err(|e| {
            tracing::debug!(template = %name, error = %e, "Template execution failed");
            Error::from(e)
        })
    }
}
