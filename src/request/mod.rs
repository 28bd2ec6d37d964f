//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! inbound path
//!     → Worker::request (normalize, reroute once)
//!     → Request::dispatch
//!         → Resolving: segment 0 → "Users_Controller" → registry
//!         → Executing: current request set, controller lifecycle runs
//!         → Interrupted (optional side channel)
//!         → OutputCaptured: current request cleared on every path
//!     → Done: captured text returned to the host
//! ```
//!
//! # Design Decisions
//! - The "current request" lives on a per-worker [`Worker`], not in a global
//! - A guard value clears it, so early returns and errors cannot leak it
//! - Nested dispatch on the same worker is rejected, not queued
//! - Headers go to a [`HeaderSink`]; `output()` can undo what dispatch sent

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::controller::ActionContext;
use crate::error::{Error, Result};
use crate::framework::Framework;
use crate::http::headers::{Header, HeaderSink};
use crate::routing::Route;

/// Suffix of derived controller class names.
pub const CONTROLLER_SUFFIX: &str = "_Controller";

/// Dispatch progress of one [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Resolving,
    Executing,
    Interrupted,
    OutputCaptured,
    Done,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::Resolving => "resolving",
            DispatchState::Executing => "executing",
            DispatchState::Interrupted => "interrupted",
            DispatchState::OutputCaptured => "output_captured",
            DispatchState::Done => "done",
        };
        f.write_str(name)
    }
}

/// `users` → `Users_Controller`.
pub fn controller_class_name(segment: &str) -> String {
    let mut chars = segment.chars();
    let mut name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    name.push_str(CONTROLLER_SUFFIX);
    name
}

/// Snapshot of the request currently executing on a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRequest {
    pub route: Route,
    pub self_route: Route,
    pub method: Method,
    pub controller: String,
}

/// Per-worker dispatch context. One per thread or task; never shared.
pub struct Worker {
    framework: Arc<Framework>,
    current: RefCell<Option<CurrentRequest>>,
}

impl Worker {
    pub fn new(framework: Arc<Framework>) -> Self {
        Self {
            framework,
            current: RefCell::new(None),
        }
    }

    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    /// Build a request for `path`, applying the reroute table once.
    pub fn request(&self, path: &str) -> Result<Request<'_>> {
        let self_route = Route::new(path)?;
        let route = self_route.rerouted(self.framework.reroutes())?;
        Ok(Request {
            worker: self,
            route,
            self_route,
            method: Method::GET,
            controller: None,
            headers: Vec::new(),
            state: DispatchState::Idle,
        })
    }

    /// The request currently executing on this worker.
    pub fn current(&self) -> Result<CurrentRequest> {
        self.current
            .borrow()
            .clone()
            .ok_or_else(|| Error::not_found("There is currently no active request."))
    }

    pub fn is_busy(&self) -> bool {
        self.current.borrow().is_some()
    }

    fn enter(&self, request: CurrentRequest) -> Result<CurrentGuard<'_>> {
        let mut slot = self.current.borrow_mut();
        if let Some(active) = slot.as_ref() {
            return Err(Error::programmer(format!(
                "Cannot dispatch '{}' while '{}' is active on this worker",
                request.route, active.route
            )));
        }
        *slot = Some(request);
        Ok(CurrentGuard { worker: self })
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("current", &self.current.borrow())
            .finish()
    }
}

/// Clears the worker's current request when dropped.
struct CurrentGuard<'w> {
    worker: &'w Worker,
}

impl Drop for CurrentGuard<'_> {
    fn drop(&mut self) {
        self.worker.current.borrow_mut().take();
    }
}

/// One inbound call.
#[derive(Debug)]
pub struct Request<'w> {
    worker: &'w Worker,
    route: Route,
    self_route: Route,
    method: Method,
    controller: Option<String>,
    headers: Vec<Header>,
    state: DispatchState,
}

impl<'w> Request<'w> {
    /// Route to execute, after rerouting.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Route as requested.
    pub fn self_route(&self) -> &Route {
        &self.self_route
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Class name of the executing controller; NotFound outside execution.
    pub fn controller(&self) -> Result<&str> {
        self.controller
            .as_deref()
            .ok_or_else(|| Error::not_found("No controller is executing for this request"))
    }

    /// Headers recorded by the last [`Request::output`] call.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Replay headers recorded by [`Request::output`], unless already sent.
    pub fn send_headers(&self, sink: &mut dyn HeaderSink) {
        if sink.sent() {
            return;
        }
        for header in &self.headers {
            sink.send(header.clone());
        }
    }

    /// Execute the request, sending headers to `sink`, and return the body.
    pub fn dispatch(&mut self, sink: &mut dyn HeaderSink) -> Result<String> {
        if !sink.sent() {
            let content_type = format!(
                "text/html; charset={}",
                self.worker.framework().settings().encoding
            );
            sink.send(Header::field("Content-Type", content_type));
        }
        self.get_output(sink)
    }

    /// Like [`Request::dispatch`], but the headers it sends are recorded in
    /// [`Request::headers`] and `sink` is put back to its prior contents
    /// when it was not committed meanwhile.
    pub fn output(&mut self, sink: &mut dyn HeaderSink) -> Result<String> {
        let previous = sink.list();
        let result = self.dispatch(sink);
        self.headers = sink.list();

        if !sink.sent() {
            sink.remove_all();
            for header in previous {
                sink.send(header);
            }
        }
        result
    }

    fn get_output(&mut self, sink: &mut dyn HeaderSink) -> Result<String> {
        self.transition(DispatchState::Resolving);
        let worker = self.worker;
        let framework = worker.framework();

        let segment = self.route.controller().map_err(|_| self.page_not_found())?;
        let class_name = controller_class_name(segment);
        let factory = framework
            .find_controller(&class_name)?
            .ok_or_else(|| self.page_not_found())?;
        let mut controller = factory();

        let _guard = worker.enter(CurrentRequest {
            route: self.route.clone(),
            self_route: self.self_route.clone(),
            method: self.method.clone(),
            controller: class_name.clone(),
        })?;
        self.controller = Some(class_name);
        self.transition(DispatchState::Executing);

        let params = self.route.params();
        let mut cx = ActionContext::new(worker, &self.route, &self.self_route, &self.method, sink);
        let result = controller.invoke(&mut cx, self.route.action(), &params);
        let interrupted = cx.is_interrupted();
        let output = cx.into_output();

        self.controller = None;
        if interrupted {
            self.transition(DispatchState::Interrupted);
        }
        self.transition(DispatchState::OutputCaptured);
        result?;
        self.transition(DispatchState::Done);
        Ok(output)
    }

    fn page_not_found(&self) -> Error {
        tracing::warn!(route = %self.route, "No controller for route");
        Error::page_not_found(format!(
            "Could not find a controller matching '{}'",
            self.route
        ))
    }

    fn transition(&mut self, next: DispatchState) {
        tracing::debug!(route = %self.route, from = %self.state, to = %next, "Dispatch state");
        self.state = next;
    }
}
