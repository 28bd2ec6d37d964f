//! Request-dispatch core for a small server-side framework.
//!
//! # Architecture Overview
//!
//! ```text
//!   inbound path
//!        │
//!        ▼
//!   ┌──────────┐    ┌──────────┐    ┌─────────────────────┐    ┌──────────┐
//!   │ routing  │───▶│ request  │───▶│ controller          │───▶│   view   │
//!   │ reroute  │    │ dispatch │    │ before/action/after │    │ + layout │
//!   └──────────┘    └────┬─────┘    └──────────┬──────────┘    └────┬─────┘
//!                        │ Error               │ Error              │
//!                        ▼                     ▼                    │
//!                   ┌──────────────────────────────┐                │
//!                   │ error: handler + render      │◀───────────────┘
//!                   └──────────────┬───────────────┘
//!                                  ▼
//!                          body + header set
//!
//!   shared by all: resource (modules) · config · strings · observability
//! ```
//!
//! A [`Framework`] is built once from module directories and shared; each
//! concurrent request runs on its own [`request::Worker`].

// Resources
pub mod config;
pub mod resource;
pub mod strings;

// Dispatch
pub mod controller;
pub mod framework;
pub mod request;
pub mod routing;
pub mod view;

// Cross-cutting concerns
pub mod error;
pub mod http;
pub mod observability;

pub use controller::{ActionContext, ActionResult, Actions, Controller};
pub use error::{Error, ErrorKind, Result};
pub use framework::{Framework, FrameworkBuilder};
pub use request::{Request, Worker};
pub use routing::Route;
pub use view::View;
