//! Controllers.
//!
//! # Responsibilities
//! - Map action names to handler functions per controller type
//! - Provide the `before`/`after` hooks and the user-error hook
//! - Classify errors leaving application code (see `lifecycle.rs`)
//!
//! # Design Decisions
//! - Actions are an explicit table, so an unknown name is a PageNotFound
//!   rather than a missing-method fault
//! - Hooks are trait methods with default bodies; overriding one replaces it
//! - One fresh controller instance per dispatch, built from the registry

pub mod context;
pub mod lifecycle;
pub mod registry;

use std::fmt;

use crate::error::{Error, Result};
use crate::view::View;

pub use context::{ActionContext, RedirectTarget};
pub use registry::{ControllerFactory, ControllerRegistry};

/// Config key naming the view used for inline user errors.
pub const USER_ERROR_VIEW_KEY: &str = "main.views.user_error";

/// What an action returns: an optional view to render into the output.
pub type ActionResult = Result<Option<View>>;

/// Action handler: controller, context, params after the action segment.
pub type Action<C> = fn(&mut C, &mut ActionContext<'_>, &[String]) -> ActionResult;

/// Name → handler table of one controller type.
pub struct Actions<C> {
    entries: Vec<(&'static str, Action<C>)>,
}

impl<C> Actions<C> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with(mut self, name: &'static str, action: Action<C>) -> Self {
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, action));
        self
    }

    pub fn get(&self, name: &str) -> Option<Action<C>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, action)| *action)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl<C> Default for Actions<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Actions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// An application controller.
///
/// ```ignore
/// #[derive(Default)]
/// struct Users;
///
/// impl Controller for Users {
///     fn actions() -> Actions<Self> {
///         Actions::new().with("show", Users::show)
///     }
/// }
/// ```
pub trait Controller: Send + 'static {
    fn actions() -> Actions<Self>
    where
        Self: Sized;

    /// Runs before every action.
    fn before(&mut self, _cx: &mut ActionContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs after every action that finished or was interrupted.
    fn after(&mut self, _cx: &mut ActionContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Run `action` through the lifecycle and classify what escapes it.
    fn invoke_action(
        &mut self,
        cx: &mut ActionContext<'_>,
        action: &str,
        params: &[String],
    ) -> Result<()>
    where
        Self: Sized,
    {
        let result = lifecycle::run(self, cx, action, params);
        lifecycle::at_boundary(self, cx, result)
    }

    /// Render a User error inline with the `main.views.user_error` view.
    fn on_user_error(&mut self, cx: &mut ActionContext<'_>, err: Error) -> Result<()> {
        tracing::debug!(message = %err.message(), "Rendering user error");
        let path = cx.config().get_str(USER_ERROR_VIEW_KEY)?;
        let mut view = View::new(path.as_str())?;
        view.set("message", err.message());
        cx.render(&mut view)
    }
}

/// Object-safe face of [`Controller`], used by the registry.
pub trait DynController: Send {
    fn invoke(&mut self, cx: &mut ActionContext<'_>, action: &str, params: &[String]) -> Result<()>;
}

impl<C: Controller> DynController for C {
    fn invoke(&mut self, cx: &mut ActionContext<'_>, action: &str, params: &[String]) -> Result<()> {
        self.invoke_action(cx, action, params)
    }
}
