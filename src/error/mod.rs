//! Error taxonomy.
//!
//! # Data Flow
//! ```text
//! application / framework code
//!     → Error { kind, message, code, location, cause }
//!     → controller boundary (lifecycle.rs classifies Expected vs Unexpected)
//!     → handler.rs (top-level: headers, render, log)
//!     → render.rs (debug or production page, chosen by Mode at render time)
//! ```
//!
//! # Design Decisions
//! - One error type with a flat kind enum instead of a class hierarchy
//! - The Expected/Unexpected split is a property of the kind (`Branch`)
//! - Causes form a singly linked chain, outermost first
//! - Foreign errors are flattened into the chain so renders show every link

pub mod handler;
pub mod render;

use std::fmt;
use std::panic::Location;

use thiserror::Error as ThisError;

pub use handler::handle_uncaught;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level branch of the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Recoverable by application code; escaping to the dispatcher is a defect.
    Expected,
    /// Programmer mistakes, environment failures and control signals.
    Unexpected,
}

/// Kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The sought item is absent (route segment, config key, view variable, module).
    NotFound,
    /// Input failed validation.
    Validation,
    /// Internal contract violation.
    Programmer,
    /// External dependency fault.
    Environment,
    /// User-facing fault, rendered inline as a message.
    User,
    /// Early-exit signal (e.g. after a redirect). Not an error as such.
    Interrupted,
    /// Routing or dispatch target absent.
    PageNotFound,
}

impl ErrorKind {
    pub fn branch(self) -> Branch {
        match self {
            ErrorKind::NotFound | ErrorKind::Validation => Branch::Expected,
            ErrorKind::Programmer
            | ErrorKind::Environment
            | ErrorKind::User
            | ErrorKind::Interrupted
            | ErrorKind::PageNotFound => Branch::Unexpected,
        }
    }

    pub fn is_expected(self) -> bool {
        self.branch() == Branch::Expected
    }

    /// HTTP status class used when this kind reaches the top-level handler.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::PageNotFound => 404,
            _ => 500,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Validation => "Validation",
            ErrorKind::Programmer => "Programmer",
            ErrorKind::Environment => "Environment",
            ErrorKind::User => "User",
            ErrorKind::Interrupted => "Interrupted",
            ErrorKind::PageNotFound => "PageNotFound",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The crate-wide error.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: i64,
    location: &'static Location<'static>,
    #[source]
    cause: Option<Box<Error>>,
}

impl Error {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: 0,
            location: Location::caller(),
            cause: None,
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    #[track_caller]
    pub fn programmer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Programmer, message)
    }

    #[track_caller]
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Environment, message)
    }

    #[track_caller]
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::User, message)
    }

    #[track_caller]
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Interrupted, message)
    }

    #[track_caller]
    pub fn page_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PageNotFound, message)
    }

    /// Wrap a foreign error, turning its `source()` chain into causes.
    #[track_caller]
    pub fn foreign(kind: ErrorKind, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut wrapped = Self::new(kind, err.to_string());
        if let Some(source) = err.source() {
            wrapped.cause = Some(Box::new(Self::foreign(kind, source)));
        }
        wrapped
    }

    /// Attach `cause` as the previous error in the chain.
    pub fn caused_by(mut self, cause: Error) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// This error followed by its causes, outermost first.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// One line per link of the chain, `#i Kind: message (file:line)`.
    pub fn trace(&self) -> String {
        self.chain()
            .enumerate()
            .map(|(i, e)| {
                format!(
                    "#{} {}: {} ({}:{})",
                    i,
                    e.kind,
                    e.message,
                    e.location.file(),
                    e.location.line()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Iterator over an error chain.
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

impl From<std::io::Error> for Error {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Error::foreign(ErrorKind::Environment, &err)
    }
}

impl From<toml::de::Error> for Error {
    #[track_caller]
    fn from(err: toml::de::Error) -> Self {
        Error::foreign(ErrorKind::Programmer, &err)
    }
}

impl From<tera::Error> for Error {
    #[track_caller]
    fn from(err: tera::Error) -> Self {
        Error::foreign(ErrorKind::Programmer, &err)
    }
}

impl From<regex::Error> for Error {
    #[track_caller]
    fn from(err: regex::Error) -> Self {
        Error::foreign(ErrorKind::Programmer, &err)
    }
}

impl From<serde_json::Error> for Error {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Error::foreign(ErrorKind::Programmer, &err)
    }
}
