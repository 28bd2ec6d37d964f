//! Shared fixtures for integration tests.
//!
//! Builds an application module in a temp directory with a few views and
//! reroutes, plus test controllers that record their lifecycle events.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::http::Method;
use dispatch_core::controller::DynController;
use dispatch_core::http::server;
use dispatch_core::http::HeaderSet;
use dispatch_core::{
    ActionContext, ActionResult, Actions, Controller, Error, Framework, FrameworkBuilder, Route,
    View, Worker,
};
use tempfile::TempDir;

pub type Events = Arc<Mutex<Vec<String>>>;

/// Write `content` to `<dir>/<relative>`, creating parent directories.
pub fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Files every test application starts with.
pub fn write_app_module(module: &Path) {
    write(
        module,
        "config/routes.toml",
        "[routes]\n\"/\" = \"/home\"\n\"/profile/([0-9]+)\" = \"/users/show/$1\"\n",
    );
    write(module, "views/users/show.html", "User {{ id }}: {{ name }}");
    write(module, "views/users/list.html", "list of {{ count }}");
    write(
        module,
        "views/layouts/main.html",
        "<main>{{ content_output }}</main>|{{ content.template }}",
    );
    write(module, "views/broken.html", "{{ never_set }}");
}

#[derive(Default)]
pub struct UsersController;

impl Controller for UsersController {
    fn actions() -> Actions<Self> {
        Actions::new()
            .with("index", Self::index)
            .with("show", Self::show)
            .with("list", Self::list)
    }
}

impl UsersController {
    fn index(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        cx.write("users index");
        Ok(None)
    }

    fn show(&mut self, _cx: &mut ActionContext<'_>, params: &[String]) -> ActionResult {
        let mut view = View::new("/users/show")?;
        view.set("id", params.first().cloned().unwrap_or_default());
        view.set("name", "Ann");
        Ok(Some(view))
    }

    fn list(&mut self, _cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        let mut view = View::new("/users/list")?;
        view.set("count", 3);
        view.set_layout("/layouts/main")?;
        Ok(Some(view))
    }
}

#[derive(Default)]
pub struct HomeController;

impl Controller for HomeController {
    fn actions() -> Actions<Self> {
        Actions::new().with("index", Self::index)
    }
}

impl HomeController {
    fn index(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        cx.write("home");
        Ok(None)
    }
}

/// Records `before`, the action name and `after` into shared events.
pub struct FlowController {
    events: Events,
}

impl FlowController {
    fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    fn redirect(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        self.record("redirect");
        cx.redirect("/target", true)?;
        cx.write("unreachable");
        Ok(None)
    }

    fn soft_redirect(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        self.record("soft_redirect");
        cx.redirect(Route::new("/users")?, false)?;
        cx.write("continued");
        Ok(None)
    }

    fn expected(&mut self, _cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        self.record("expected");
        Err(Error::not_found("lost"))
    }

    fn user(&mut self, _cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        self.record("user");
        Err(Error::user("Bad input"))
    }

    fn boom(&mut self, _cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        self.record("boom");
        Err(Error::programmer("alpha-fault").caused_by(
            Error::environment("beta-fault").caused_by(Error::validation("gamma-fault")),
        ))
    }

    fn current(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        let current = cx.worker().current()?;
        cx.write(&format!(
            "{} {} {}",
            current.controller, current.route, current.self_route
        ));
        Ok(None)
    }

    fn nested(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        let mut inner = cx.worker().request("/home")?;
        let output = inner.dispatch(cx.headers())?;
        cx.write(&output);
        Ok(None)
    }

    fn broken_view(&mut self, _cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        Ok(Some(View::new("/broken")?))
    }

    fn method(&mut self, cx: &mut ActionContext<'_>, _params: &[String]) -> ActionResult {
        let method = if cx.is_post() { "post" } else if cx.is_get() { "get" } else { "other" };
        cx.write(method);
        Ok(None)
    }

    fn params(&mut self, cx: &mut ActionContext<'_>, params: &[String]) -> ActionResult {
        cx.write(&params.join(","));
        Ok(None)
    }
}

impl Controller for FlowController {
    fn actions() -> Actions<Self> {
        Actions::new()
            .with("redirect", Self::redirect)
            .with("soft_redirect", Self::soft_redirect)
            .with("expected", Self::expected)
            .with("user", Self::user)
            .with("boom", Self::boom)
            .with("current", Self::current)
            .with("nested", Self::nested)
            .with("broken_view", Self::broken_view)
            .with("method", Self::method)
            .with("params", Self::params)
    }

    fn before(&mut self, _cx: &mut ActionContext<'_>) -> dispatch_core::Result<()> {
        self.record("before");
        Ok(())
    }

    fn after(&mut self, _cx: &mut ActionContext<'_>) -> dispatch_core::Result<()> {
        self.record("after");
        Ok(())
    }
}

/// Framework builder with the test module and controllers registered.
pub fn builder(module: &Path, events: &Events) -> FrameworkBuilder {
    let events = events.clone();
    Framework::builder()
        .module(module)
        .controller::<UsersController>("controller/users")
        .controller::<HomeController>("controller/home")
        .controller_with("controller/flow", move || {
            Box::new(FlowController {
                events: events.clone(),
            }) as Box<dyn DynController>
        })
}

pub struct TestApp {
    _root: TempDir,
    pub module: PathBuf,
    pub events: Events,
    pub framework: Arc<Framework>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    /// Test app whose module also has `config/main.toml` = `main`.
    pub fn with_main_config(main: &str) -> Self {
        Self::with(|module| write(module, "config/main.toml", main))
    }

    /// Test app with extra files written by `setup`.
    pub fn with(setup: impl FnOnce(&Path)) -> Self {
        let root = TempDir::new().unwrap();
        let module = root.path().join("app");
        write_app_module(&module);
        setup(&module);

        let events = Events::default();
        let framework = Arc::new(builder(&module, &events).build().unwrap());
        Self {
            _root: root,
            module,
            events,
            framework,
        }
    }

    pub fn worker(&self) -> Worker {
        Worker::new(self.framework.clone())
    }

    /// Dispatch `path` on a fresh worker.
    pub fn dispatch(&self, path: &str) -> (HeaderSet, dispatch_core::Result<String>) {
        let worker = self.worker();
        let mut headers = HeaderSet::new();
        let result = worker.request(path).and_then(|mut request| request.dispatch(&mut headers));
        (headers, result)
    }

    /// Serve `path` the way the HTTP host does, errors included.
    pub fn serve(&self, path: &str) -> (HeaderSet, String) {
        server::serve(self.framework.clone(), Method::GET, path)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}
