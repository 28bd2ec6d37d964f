//! Error pages.
//!
//! The render strategy is picked from the framework mode when the page is
//! rendered, not when the error was raised. Debug pages list every link of
//! the cause chain; production pages show one generic message.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::config::Mode;
use crate::error::{Error, ErrorKind, Result};
use crate::framework::Framework;
use crate::http::headers::{Header, HeaderSink};
use crate::view::View;

/// String key of the production error message.
pub const PAGE_LOAD_FAILED_KEY: &str = "core.page-load-failed";

/// Used when [`PAGE_LOAD_FAILED_KEY`] cannot be found.
pub const PAGE_LOAD_FAILED: &str = "The page could not be loaded.";

/// String key of the production message for PageNotFound.
pub const PAGE_NOT_FOUND_KEY: &str = "core.page-not-found";

/// Used when [`PAGE_NOT_FOUND_KEY`] cannot be found.
pub const PAGE_NOT_FOUND: &str = "The page you requested does not exist.";

/// One entry of the debug page's `exceptions` list.
#[derive(Debug, Clone, Serialize)]
pub struct ChainEntry {
    pub kind: &'static str,
    pub message: String,
    pub code: i64,
    pub file: &'static str,
    pub line: u32,
    pub trace: String,
}

impl Error {
    /// Send the status headers of this error.
    pub fn send_headers(&self, sink: &mut dyn HeaderSink) {
        sink.send(Header::status(StatusCode::INTERNAL_SERVER_ERROR));
        if self.is(ErrorKind::PageNotFound) {
            sink.send(Header::status(StatusCode::NOT_FOUND));
        }
    }

    /// Chain entries, outermost first.
    pub fn chain_entries(&self) -> Vec<ChainEntry> {
        self.chain()
            .map(|e| ChainEntry {
                kind: e.kind().name(),
                message: e.message().to_string(),
                code: e.code(),
                file: e.location().file(),
                line: e.location().line(),
                trace: e.trace(),
            })
            .collect()
    }

    /// Render the error page for the framework's current mode.
    pub fn render(&self, framework: &Framework) -> Result<String> {
        match framework.mode() {
            Mode::Debug => self.render_debug(framework),
            Mode::Production => self.render_production(framework),
        }
    }

    fn render_debug(&self, framework: &Framework) -> Result<String> {
        let mut view = self.page_view(framework, "main.views.debug")?;
        view.set_serialized("exceptions", &self.chain_entries())?;
        view.render(framework)
    }

    fn render_production(&self, framework: &Framework) -> Result<String> {
        let (key, fallback) = if self.is(ErrorKind::PageNotFound) {
            (PAGE_NOT_FOUND_KEY, PAGE_NOT_FOUND)
        } else {
            (PAGE_LOAD_FAILED_KEY, PAGE_LOAD_FAILED)
        };
        let message = framework
            .string(key, &[])
            .unwrap_or_else(|_| fallback.to_string());

        let mut view = self.page_view(framework, "main.views")?;
        view.set("message", Value::String(message));
        view.render(framework)
    }

    /// `<prefix>.404` for PageNotFound, `<prefix>.exception` otherwise, inside
    /// `<prefix>.exception_layout`.
    fn page_view(&self, framework: &Framework, prefix: &str) -> Result<View> {
        let config = framework.config();
        let page = if self.is(ErrorKind::PageNotFound) { "404" } else { "exception" };

        let mut view = View::new(config.get_str(&format!("{}.{}", prefix, page))?.as_str())?;
        view.set_layout(config.get_str(&format!("{}.exception_layout", prefix))?.as_str())?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::HeaderSet;

    #[test]
    fn test_headers() {
        let mut sink = HeaderSet::new();
        Error::programmer("boom").send_headers(&mut sink);
        assert_eq!(sink.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let mut sink = HeaderSet::new();
        Error::page_not_found("gone").send_headers(&mut sink);
        assert_eq!(sink.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_chain_entries_order() {
        let err = Error::programmer("A")
            .caused_by(Error::environment("B").with_code(2).caused_by(Error::not_found("C")));
        let entries = err.chain_entries();
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["A", "B", "C"]);
        assert_eq!(entries[1].kind, "Environment");
        assert_eq!(entries[1].code, 2);
        assert!(entries[0].line > 0);
    }

    #[test]
    fn test_bundled_pages_render() {
        let framework = Framework::builder().build().unwrap();

        let debug = Error::programmer("outer").caused_by(Error::not_found("inner"));
        let html = debug.render(&framework).unwrap();
        let outer = html.find("outer").unwrap();
        let inner = html.find("inner").unwrap();
        assert!(outer < inner);

        framework.set_mode(Mode::Production);
        let html = Error::programmer("secret detail").render(&framework).unwrap();
        assert!(html.contains(PAGE_LOAD_FAILED));
        assert!(!html.contains("secret detail"));

        let html = Error::page_not_found("nope").render(&framework).unwrap();
        assert!(html.contains("404"));
        assert!(html.contains(PAGE_NOT_FOUND));
        assert!(!html.contains(PAGE_LOAD_FAILED));
    }
}
