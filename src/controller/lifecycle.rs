//! Action invocation.
//!
//! # Data Flow
//! ```text
//! before()
//!     → action lookup (missing ⇒ PageNotFound)
//!     → action(params) → Option<View> (rendered into the output)
//!     → Interrupted? swallowed, context marked
//!     → after()
//!     → boundary: Expected ⇒ Programmer, User ⇒ on_user_error
//! ```

use crate::controller::{ActionContext, Actions, Controller};
use crate::error::{Error, ErrorKind, Result};

/// Run `before`, the action and `after`. An Interrupted error from `before`
/// or the action is swallowed; any other error skips `after` and propagates.
pub fn run<C: Controller>(
    controller: &mut C,
    cx: &mut ActionContext<'_>,
    action: &str,
    params: &[String],
) -> Result<()> {
    let actions = C::actions();
    match invoke(controller, &actions, cx, action, params) {
        Ok(()) => {}
        Err(err) if err.is(ErrorKind::Interrupted) => {
            tracing::debug!(action = %action, reason = %err, "Action interrupted");
            cx.mark_interrupted();
        }
        Err(err) => return Err(err),
    }
    controller.after(cx)
}

fn invoke<C: Controller>(
    controller: &mut C,
    actions: &Actions<C>,
    cx: &mut ActionContext<'_>,
    action: &str,
    params: &[String],
) -> Result<()> {
    controller.before(cx)?;

    let handler = actions
        .get(action)
        .ok_or_else(|| Error::page_not_found(format!("Action '{}' not found", action)))?;

    if let Some(mut view) = handler(controller, cx, params)? {
        cx.render(&mut view)?;
    }
    Ok(())
}

/// Classify an error leaving application code.
pub fn at_boundary<C: Controller>(
    controller: &mut C,
    cx: &mut ActionContext<'_>,
    result: Result<()>,
) -> Result<()> {
    match result {
        Err(err) if err.kind().is_expected() => Err(Error::programmer(
            "An expected error failed to be caught in application code",
        )
        .caused_by(err)),
        Err(err) if err.is(ErrorKind::User) => controller.on_user_error(cx, err),
        other => other,
    }
}
