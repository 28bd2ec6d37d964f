//! Top-level handler for errors that escape dispatch.
//!
//! # Responsibilities
//! - Replace whatever body the request produced with an error page
//! - Send the error's status headers unless headers were already sent
//! - Degrade to an inline page when the error page itself fails
//! - Log the error to tracing and, when configured, to the error log file
//!
//! Never returns an error and never panics on render failures.

use crate::config::Mode;
use crate::error::Error;
use crate::framework::Framework;
use crate::http::headers::HeaderSink;
use crate::observability::error_log;

/// Production body when the error page cannot be rendered.
pub const FALLBACK_MESSAGE: &str = "An error occurred while trying to display the page.";

/// Turn an uncaught error into a response body.
pub fn handle_uncaught(framework: &Framework, err: Error, sink: &mut dyn HeaderSink) -> String {
    let err = if err.kind().is_expected() {
        Error::programmer("An expected error escaped to the top-level handler").caused_by(err)
    } else {
        err
    };

    if !sink.sent() {
        err.send_headers(sink);
    }

    let body = match err.render(framework) {
        Ok(body) => body,
        Err(render_err) => {
            tracing::error!(
                kind = %render_err.kind(),
                error = %render_err,
                "Error page could not be rendered"
            );
            fallback(framework.mode(), &err, &render_err)
        }
    };

    log(framework, &err);
    body
}

fn fallback(mode: Mode, err: &Error, render_err: &Error) -> String {
    match mode {
        Mode::Production => FALLBACK_MESSAGE.to_string(),
        Mode::Debug => format!(
            "<h1>{}</h1>\n<pre>{}</pre>\n<h2>While rendering the error page</h2>\n<pre>{}</pre>\n",
            tera::escape_html(err.message()),
            tera::escape_html(&err.trace()),
            tera::escape_html(&render_err.trace()),
        ),
    }
}

fn log(framework: &Framework, err: &Error) {
    if err.is(crate::error::ErrorKind::PageNotFound) {
        tracing::warn!(kind = %err.kind(), message = %err.message(), "Page not found");
    } else {
        tracing::error!(
            kind = %err.kind(),
            message = %err.message(),
            trace = %err.trace(),
            "Uncaught error"
        );
    }

    if let Some(path) = &framework.settings().error_log_file {
        if let Err(e) = error_log::append(path, err) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write error log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::headers::{Header, HeaderSet};
    use axum::http::StatusCode;

    #[test]
    fn test_expected_is_rewrapped() {
        let framework = Framework::builder().build().unwrap();
        let mut sink = HeaderSet::new();
        let body = handle_uncaught(&framework, Error::not_found("missing thing"), &mut sink);

        assert_eq!(sink.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("escaped to the top-level handler"));
        assert!(body.contains("missing thing"));
    }

    #[test]
    fn test_committed_headers_untouched() {
        let framework = Framework::builder().build().unwrap();
        let mut sink = HeaderSet::new();
        sink.send(Header::field("X-Sent", "yes"));
        sink.commit();

        handle_uncaught(&framework, Error::page_not_found("gone"), &mut sink);
        assert_eq!(sink.status_code(), StatusCode::OK);
    }

    #[test]
    fn test_fallback_bodies() {
        let err = Error::programmer("<bad>");
        let render_err = Error::not_found("view missing");

        assert_eq!(fallback(Mode::Production, &err, &render_err), FALLBACK_MESSAGE);
        let debug = fallback(Mode::Debug, &err, &render_err);
        assert!(debug.contains("&lt;bad&gt;"));
        assert!(debug.contains("view missing"));
        assert!(err.is(ErrorKind::Programmer));
    }
}
