//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → strip base URL, one Worker per request (blocking thread)
//!     → Request::dispatch (headers into a HeaderSet)
//!     → headers.rs (status + fields, committed once)
//!     → Send to client
//! ```

pub mod headers;
pub mod server;

pub use headers::{Header, HeaderSet, HeaderSink};
pub use server::HttpServer;
