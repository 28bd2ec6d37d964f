//! Regex rerouting.
//!
//! The `routes.routes` config table maps patterns to replacements, in
//! declaration order. The first pattern that matches the whole route wins;
//! its replacement may use `$1`-style back-references. Patterns are
//! normalized like routes, so backslash escapes are not available; use
//! character classes such as `[0-9]` instead.

use regex::Regex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::routing::route::Route;

/// Config key holding the reroute table.
pub const REROUTES_KEY: &str = "routes.routes";

#[derive(Debug)]
struct Reroute {
    from: String,
    pattern: Regex,
    to: String,
}

/// Ordered, compiled reroute rules.
#[derive(Debug, Default)]
pub struct RerouteTable {
    rules: Vec<Reroute>,
}

impl RerouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered `(pattern, replacement)` pairs. Both sides are
    /// normalized as routes.
    pub fn from_pairs<I, A, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut table = Self::new();
        for (from, to) in pairs {
            table.push(from.as_ref(), to.as_ref())?;
        }
        Ok(table)
    }

    /// Build from the `routes.routes` config table; empty when absent.
    pub fn from_config(config: &Config<'_>) -> Result<Self> {
        let Some(value) = config.lookup(REROUTES_KEY)? else {
            return Ok(Self::new());
        };
        let table = value
            .as_table()
            .ok_or_else(|| Error::programmer(format!("'{}' must be a table", REROUTES_KEY)))?;

        let mut pairs = Vec::with_capacity(table.len());
        for (from, to) in table {
            let to = to.as_str().ok_or_else(|| {
                Error::programmer(format!("Reroute target for '{}' must be a string", from))
            })?;
            pairs.push((from.clone(), to.to_string()));
        }
        Self::from_pairs(pairs)
    }

    pub fn push(&mut self, from: &str, to: &str) -> Result<()> {
        let from = Route::normalize(from)?;
        let to = Route::normalize(to)?;
        let pattern = Regex::new(&format!("^(?:{})$", from)).map_err(|e| {
            Error::programmer(format!("Invalid reroute pattern '{}'", from)).caused_by(e.into())
        })?;
        let to = brace_group_refs(&to);
        self.rules.push(Reroute { from, pattern, to });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `route` with the first matching rule, or return it unchanged.
    pub fn apply(&self, route: &Route) -> Result<Route> {
        let path = route.as_str();
        for rule in &self.rules {
            if rule.pattern.is_match(path) {
                let rewritten = rule.pattern.replace(path, rule.to.as_str());
                tracing::debug!(from = %path, pattern = %rule.from, to = %rewritten, "Route rerouted");
                return Route::new(&rewritten);
            }
        }
        Ok(route.clone())
    }
}

/// `$1` → `${1}`, so a group number followed by word characters (`$1_view`)
/// is not read as a named group. `$$` stays a literal dollar.
fn brace_group_refs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            _ => out.push('$'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_no_match_passes_through() {
        let table = RerouteTable::from_pairs([("/old", "/new")]).unwrap();
        let route = Route::new("/other/page").unwrap();
        assert_eq!(table.apply(&route).unwrap(), route);
    }

    #[test]
    fn test_first_match_wins() {
        let table = RerouteTable::from_pairs([
            ("/blog/([0-9]+)", "/posts/show/$1"),
            ("/blog/.*", "/posts/list"),
            ("/.*", "/catchall"),
        ])
        .unwrap();

        let route = Route::new("/blog/17").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/posts/show/17");

        let route = Route::new("/blog/latest").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/posts/list");
    }

    #[test]
    fn test_anchored_match() {
        let table = RerouteTable::from_pairs([("/a", "/b")]).unwrap();
        let route = Route::new("/a/c").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/a/c");

        let alternation = RerouteTable::from_pairs([("/x|/y", "/z")]).unwrap();
        let route = Route::new("/xy").unwrap();
        assert_eq!(alternation.apply(&route).unwrap().as_str(), "/xy");
    }

    #[test]
    fn test_backref_followed_by_text() {
        let table = RerouteTable::from_pairs([
            ("/p/([a-z]+)", "/pages/$1_view"),
            ("/q/([a-z]+)/([0-9]+)", "/items/$2x/$1"),
        ])
        .unwrap();

        let route = Route::new("/p/about").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/pages/about_view");

        let route = Route::new("/q/shoes/12").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/items/12x/shoes");
    }

    #[test]
    fn test_brace_group_refs() {
        assert_eq!(brace_group_refs("/a/$1_b/$23"), "/a/${1}_b/${23}");
        assert_eq!(brace_group_refs("/cost/$$1"), "/cost/$$1");
        assert_eq!(brace_group_refs("/plain/$name"), "/plain/$name");
    }

    #[test]
    fn test_single_pass() {
        let table = RerouteTable::from_pairs([("/a", "/b"), ("/b", "/c")]).unwrap();
        let route = Route::new("/a").unwrap();
        assert_eq!(table.apply(&route).unwrap().as_str(), "/b");
    }

    #[test]
    fn test_normalized_rules() {
        let table = RerouteTable::from_pairs([("/home/", "/pages//index/")]).unwrap();
        let route = Route::new("/home").unwrap();
        assert_eq!(route.rerouted(&table).unwrap().as_str(), "/pages/index");
    }

    #[test]
    fn test_invalid_rules() {
        assert_eq!(
            RerouteTable::from_pairs([("/(unclosed", "/x")]).unwrap_err().kind(),
            ErrorKind::Programmer
        );
        assert_eq!(
            RerouteTable::from_pairs([("relative", "/x")]).unwrap_err().kind(),
            ErrorKind::Programmer
        );
    }
}
