//! Per-invocation context handed to controller hooks and actions.

use std::fmt;

use axum::http::{Method, StatusCode};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::framework::Framework;
use crate::http::headers::{Header, HeaderSink};
use crate::request::Worker;
use crate::routing::{url, Route};
use crate::view::View;

/// Where a redirect points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Application route, made absolute against the base URL.
    Route(Route),
    /// Used verbatim.
    Url(String),
}

impl From<Route> for RedirectTarget {
    fn from(route: Route) -> Self {
        RedirectTarget::Route(route)
    }
}

impl From<&Route> for RedirectTarget {
    fn from(route: &Route) -> Self {
        RedirectTarget::Route(route.clone())
    }
}

impl From<&str> for RedirectTarget {
    fn from(url: &str) -> Self {
        RedirectTarget::Url(url.to_string())
    }
}

impl From<String> for RedirectTarget {
    fn from(url: String) -> Self {
        RedirectTarget::Url(url)
    }
}

pub struct ActionContext<'a> {
    framework: &'a Framework,
    worker: &'a Worker,
    route: &'a Route,
    self_route: &'a Route,
    method: &'a Method,
    headers: &'a mut dyn HeaderSink,
    output: String,
    interrupted: bool,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        worker: &'a Worker,
        route: &'a Route,
        self_route: &'a Route,
        method: &'a Method,
        headers: &'a mut dyn HeaderSink,
    ) -> Self {
        Self {
            framework: worker.framework(),
            worker,
            route,
            self_route,
            method,
            headers,
            output: String::new(),
            interrupted: false,
        }
    }

    pub fn framework(&self) -> &'a Framework {
        self.framework
    }

    pub fn worker(&self) -> &'a Worker {
        self.worker
    }

    /// Route being executed, after rerouting.
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Route as requested, before rerouting.
    pub fn self_route(&self) -> &'a Route {
        self.self_route
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    pub fn is_get(&self) -> bool {
        *self.method == Method::GET
    }

    pub fn is_post(&self) -> bool {
        *self.method == Method::POST
    }

    pub fn config(&self) -> Config<'a> {
        self.framework.config()
    }

    pub fn string(&self, key: &str, args: &[&dyn fmt::Display]) -> Result<String> {
        self.framework.string(key, args)
    }

    pub fn headers(&mut self) -> &mut dyn HeaderSink {
        &mut *self.headers
    }

    pub fn send_header(&mut self, header: Header) {
        if !self.headers.sent() {
            self.headers.send(header);
        }
    }

    /// Append to the captured response body.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    /// Render `view` and append its output.
    pub fn render(&mut self, view: &mut View) -> Result<()> {
        let rendered = view.render(self.framework)?;
        self.write(&rendered);
        Ok(())
    }

    /// Render the view at `path` with no data and append its output.
    pub fn view(&mut self, path: &str) -> Result<()> {
        let mut view = View::new(path)?;
        self.render(&mut view)
    }

    /// Send `303 See Other` with a Location header. With `interrupt`, returns
    /// an Interrupted error so `?` unwinds the rest of the action.
    pub fn redirect(&mut self, target: impl Into<RedirectTarget>, interrupt: bool) -> Result<()> {
        let location = match target.into() {
            RedirectTarget::Route(route) => url::route(self.framework, &route),
            RedirectTarget::Url(url) => url,
        };
        tracing::debug!(location = %location, interrupt, "Redirecting");

        if !self.headers.sent() {
            self.headers.send(Header::status(StatusCode::SEE_OTHER));
            self.headers.send(Header::field("Location", location));
        }

        if interrupt {
            Err(Error::interrupted("Redirecting"))
        } else {
            Ok(())
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub(crate) fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }
}
