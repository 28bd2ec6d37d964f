//! Resource file loading and overlay lookup.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::resource::Modules;

/// Loads a structured resource file (config or strings).
pub trait ResourceLoader: Send + Sync + std::fmt::Debug {
    /// File extension, without the dot, of the files this loader reads.
    fn extension(&self) -> &str;

    /// Parse the file at `path`.
    fn load(&self, path: &Path) -> Result<toml::Value>;
}

/// Loader for TOML resource files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlLoader;

impl ResourceLoader for TomlLoader {
    fn extension(&self) -> &str {
        "toml"
    }

    fn load(&self, path: &Path) -> Result<toml::Value> {
        let content = fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| {
            Error::programmer(format!("Resource file '{}' could not be parsed", path.display()))
                .caused_by(e.into())
        })?;
        Ok(toml::Value::Table(table))
    }
}

/// Walk `indices` into `value`. Array elements are addressed by position.
pub fn drill<'a>(value: &'a toml::Value, indices: &[&str]) -> Option<&'a toml::Value> {
    indices.iter().try_fold(value, |item, index| match item {
        toml::Value::Table(table) => table.get(*index),
        toml::Value::Array(items) => index.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Search modules in priority order for `<dir>/<file>.<ext>` containing the
/// item at `indices`. A file that exists but lacks the item does not stop the
/// search; the next module is tried.
pub fn find_item(
    modules: &Modules,
    loader: &dyn ResourceLoader,
    dir: &str,
    file: &str,
    indices: &[&str],
) -> Result<Option<toml::Value>> {
    let relative = format!("{}/{}.{}", dir, file, loader.extension());
    for candidate in modules.candidates(&relative) {
        if !candidate.exists() {
            continue;
        }
        let values = loader.load(&candidate)?;
        if let Some(item) = drill(&values, indices) {
            return Ok(Some(item.clone()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill() {
        let value: toml::Value = toml::from_str(
            r#"
            name = "x"
            [views.debug]
            "404" = "/core/404.html"
            [list]
            items = ["a", "b"]
            "#,
        )
        .unwrap();

        assert_eq!(drill(&value, &["name"]).and_then(|v| v.as_str()), Some("x"));
        assert_eq!(
            drill(&value, &["views", "debug", "404"]).and_then(|v| v.as_str()),
            Some("/core/404.html")
        );
        assert_eq!(drill(&value, &["list", "items", "1"]).and_then(|v| v.as_str()), Some("b"));
        assert!(drill(&value, &["views", "missing"]).is_none());
        assert!(drill(&value, &["name", "deeper"]).is_none());
        assert!(drill(&value, &[]).is_some());
    }
}
