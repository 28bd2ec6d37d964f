//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check path shapes (base URL is root-relative)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the typed settings
//! - Runs before the Framework accepts the settings

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{MainConfig, ServerConfig};
use crate::error::Error as FrameworkError;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("main.encoding must not be empty")]
    EmptyEncoding,

    #[error("main.language '{0}' is not a valid language tag")]
    InvalidLanguage(String),

    #[error("main.base_url '{0}' must start with '/'")]
    RelativeBaseUrl(String),

    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

pub fn validate_main(config: &MainConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.encoding.trim().is_empty() {
        errors.push(ValidationError::EmptyEncoding);
    }

    let language_ok = !config.language.is_empty()
        && config
            .language
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if !language_ok {
        errors.push(ValidationError::InvalidLanguage(config.language.clone()));
    }

    if let Some(base) = &config.base_url {
        if !base.is_empty() && !base.starts_with('/') {
            errors.push(ValidationError::RelativeBaseUrl(base.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_server(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.bind_address.clone()));
    }
    if config.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fold a list of validation errors into one framework error.
pub fn into_error(errors: Vec<ValidationError>) -> FrameworkError {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    FrameworkError::programmer(format!("Validation failed: {}", joined))
}
