//! Domain-relative URLs.

use crate::error::Result;
use crate::framework::Framework;
use crate::request::Worker;
use crate::resource::path;
use crate::routing::Route;

/// Base URL of the application, `/` when `main.base_url` is unset.
pub fn base(framework: &Framework) -> String {
    match framework.settings().base_url.as_deref() {
        Some(base) if !base.is_empty() => path::normalize(base),
        _ => "/".to_string(),
    }
}

/// URL of `route` under the base URL.
pub fn route(framework: &Framework, route: &Route) -> String {
    path::concat(&[base(framework), route.as_str().to_string()])
}

/// Like [`route`], from a route string.
pub fn route_str(framework: &Framework, route_path: &str) -> Result<String> {
    Ok(route(framework, &Route::new(route_path)?))
}

/// URL of the request executing on `worker` as it was requested, or the
/// base URL when no request is active.
pub fn self_url(worker: &Worker) -> String {
    match worker.current() {
        Ok(current) => route(worker.framework(), &current.self_route),
        Err(_) => base(worker.framework()),
    }
}

/// Strip the base URL from an inbound path. Paths outside the base are
/// returned unchanged.
pub fn strip_base<'p>(framework: &Framework, inbound: &'p str) -> &'p str {
    let base = base(framework);
    if base == "/" {
        return inbound;
    }
    match inbound.strip_prefix(base.as_str()) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => inbound,
    }
}
