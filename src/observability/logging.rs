//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Let `RUST_LOG` override the level given on the command line
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Human-readable fmt output; the error log file is written separately

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_FILTER: &str = "dispatch_core=info,tower_http=info";

/// Filter directive for `level`, applied to this crate and tower-http.
pub fn filter_for(level: Option<&str>) -> String {
    match level {
        Some(level) => format!("dispatch_core={level},tower_http={level}"),
        None => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for() {
        assert_eq!(filter_for(None), DEFAULT_FILTER);
        assert_eq!(filter_for(Some("debug")), "dispatch_core=debug,tower_http=debug");
    }
}
