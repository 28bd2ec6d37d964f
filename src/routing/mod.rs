//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path
//!     → route.rs (normalize, segment access)
//!     → reroute.rs (first matching pattern rewrites the route, once)
//!     → Return: Route (controller, action, params)
//!
//! Reroute Compilation (at Framework build):
//!     routes.routes config table
//!     → Normalize both sides
//!     → Compile anchored regexes in declaration order
//!     → Freeze as immutable RerouteTable
//! ```
//!
//! # Design Decisions
//! - Routes are immutable; rerouting returns a new Route
//! - Deterministic: first match wins (declaration order)
//! - One rewrite pass, no re-matching of the result
//! - url.rs turns routes back into domain-relative URLs

pub mod reroute;
pub mod route;
pub mod url;

pub use reroute::RerouteTable;
pub use route::{Route, DEFAULT_ACTION};
