//! Route model.
//!
//! # Responsibilities
//! - Normalize root-relative request paths
//! - Address the path by segment (controller, action, params)
//! - Produce rerouted copies
//!
//! # Design Decisions
//! - Immutable once constructed; rerouting returns a new Route
//! - A relative path is a programmer mistake, never silently fixed
//! - Out-of-range segment access is NotFound, distinct from a malformed route

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::resource::path::collapse_slashes;
use crate::routing::reroute::RerouteTable;

/// Action used when a route has no second segment.
pub const DEFAULT_ACTION: &str = "index";

/// A normalized, root-relative path such as `/users/show/42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    path: String,
}

impl Route {
    /// Normalize a route string.
    ///
    /// Backslashes become `/`, trailing and repeated slashes are dropped and
    /// the empty path becomes `/`.
    pub fn normalize(path: &str) -> Result<String> {
        if !path.is_empty() && !path.starts_with('/') {
            return Err(Error::programmer(format!("Routes can't be relative: '{}'", path)));
        }

        let converted = if path.is_empty() {
            "/".to_string()
        } else {
            path.replace('\\', "/")
        };

        let trimmed = converted.trim_end_matches('/');
        let route = if trimmed.is_empty() { converted.as_str() } else { trimmed };

        Ok(collapse_slashes(route))
    }

    pub fn new(path: &str) -> Result<Self> {
        Ok(Self {
            path: Self::normalize(path)?,
        })
    }

    /// The root route `/`.
    pub fn root() -> Self {
        Self { path: "/".to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> Vec<&str> {
        if self.path == "/" {
            Vec::new()
        } else {
            self.path.trim_matches('/').split('/').collect()
        }
    }

    pub fn num_segments(&self) -> usize {
        self.segments().len()
    }

    /// Zero-based segment access.
    pub fn segment(&self, index: usize) -> Result<&str> {
        self.segments()
            .get(index)
            .copied()
            .ok_or_else(|| Error::not_found(format!("No such segment '{}'", index)))
    }

    /// First segment. NotFound for the root route.
    pub fn controller(&self) -> Result<&str> {
        self.segment(0)
    }

    /// Second segment, or [`DEFAULT_ACTION`].
    pub fn action(&self) -> &str {
        self.segment(1).unwrap_or(DEFAULT_ACTION)
    }

    /// Segments after the action.
    pub fn params(&self) -> Vec<String> {
        self.segments().into_iter().skip(2).map(str::to_string).collect()
    }

    /// Apply `table` once and return the result as a new Route.
    pub fn rerouted(&self, table: &RerouteTable) -> Result<Route> {
        table.apply(self)
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_rules() {
        assert_eq!(Route::normalize("").unwrap(), "/");
        assert_eq!(Route::normalize("/").unwrap(), "/");
        assert_eq!(Route::normalize("///").unwrap(), "/");
        assert_eq!(Route::normalize("/foo///bar/").unwrap(), "/foo/bar");
        assert_eq!(Route::normalize("/foo\\bar\\").unwrap(), "/foo/bar");
        assert_eq!(Route::normalize("/a//b//c").unwrap(), "/a/b/c");
    }

    #[test]
    fn test_relative_is_programmer_error() {
        let err = Route::normalize("foo/bar").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Programmer);
        assert_eq!(Route::new("\\foo").unwrap_err().kind(), ErrorKind::Programmer);
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in ["", "/", "//", "/a/", "/a//b/", "/a\\\\b", "/x/y/z///", "/\\/"] {
            let once = Route::normalize(input).unwrap();
            let twice = Route::normalize(&once).unwrap();
            assert_eq!(once, twice, "input {:?}", input);
            assert!(once == "/" || !once.ends_with('/'));
            assert!(!once.contains("//"));
        }
    }

    #[test]
    fn test_segments() {
        let route = Route::new("/users/show/42").unwrap();
        assert_eq!(route.controller().unwrap(), "users");
        assert_eq!(route.action(), "show");
        assert_eq!(route.params(), vec!["42".to_string()]);
        assert_eq!(route.num_segments(), 3);
        assert_eq!(route.segment(3).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_default_action_and_params() {
        let single = Route::new("/users").unwrap();
        assert_eq!(single.action(), DEFAULT_ACTION);
        assert!(single.params().is_empty());

        let two = Route::new("/users/list").unwrap();
        assert!(two.params().is_empty());

        let four = Route::new("/a/b/c/d").unwrap();
        assert_eq!(four.params(), vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_root_route() {
        let root = Route::new("").unwrap();
        assert_eq!(root, Route::root());
        assert_eq!(root.controller().unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(root.action(), DEFAULT_ACTION);
        assert!(root.params().is_empty());
    }
}
