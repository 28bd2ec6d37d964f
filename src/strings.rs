//! Localized strings.
//!
//! A key like `"shop.out-of-stock"` names item `out-of-stock` in
//! `strings/<lang>/shop.toml`. Lookup uses the configured language first,
//! then [`DEFAULT_LANGUAGE`]. Each `{}` in the found text is replaced by the
//! next argument.

use std::fmt::Display;

use crate::config::loader::{self, ResourceLoader};
use crate::config::schema::DEFAULT_LANGUAGE;
use crate::error::{Error, Result};
use crate::resource::Modules;

pub const STRINGS_DIR: &str = "strings";

#[derive(Debug, Clone, Copy)]
pub struct Strings<'a> {
    modules: &'a Modules,
    loader: &'a dyn ResourceLoader,
    language: &'a str,
}

impl<'a> Strings<'a> {
    pub fn new(modules: &'a Modules, loader: &'a dyn ResourceLoader, language: &'a str) -> Self {
        Self {
            modules,
            loader,
            language,
        }
    }

    pub fn get(&self, key: &str, args: &[&dyn Display]) -> Result<String> {
        let template = match self.in_language(key, self.language)? {
            Some(found) => found,
            None => self
                .in_language(key, DEFAULT_LANGUAGE)?
                .ok_or_else(|| Error::not_found(format!("Could not find a string for '{}'", key)))?,
        };
        Ok(format_args_positional(&template, args))
    }

    fn in_language(&self, key: &str, language: &str) -> Result<Option<String>> {
        let mut parts = key.split('.');
        let file = parts.next().unwrap_or_default();
        let indices: Vec<&str> = parts.collect();
        let dir = format!("{}/{}", STRINGS_DIR, language);

        let found = loader::find_item(self.modules, self.loader, &dir, file, &indices)?;
        Ok(found.and_then(|value| value.as_str().map(str::to_string)))
    }
}

fn format_args_positional(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(at) = rest.find("{}") {
        out.push_str(&rest[..at]);
        match args.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[at + 2..];
    }
    out.push_str(rest);
    out
}
