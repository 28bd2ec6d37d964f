//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (tracing events with structured fields)
//!
//! Top-level error handler additionally produces:
//!     → error_log.rs (timestamped plain-text records in main.error_log_file)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through tracing spans from the HTTP layer
//! - File logging only for uncaught errors; everything else goes to tracing

pub mod error_log;
pub mod logging;

pub use logging::init_logging;
