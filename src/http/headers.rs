//! Response header accumulation.
//!
//! # Responsibilities
//! - Abstract the "send header" side effect behind [`HeaderSink`]
//! - Buffer headers until the host commits them
//! - Refuse changes once committed ("already sent")
//!
//! # Design Decisions
//! - A status line replaces any earlier status
//! - A field replaces earlier fields of the same name (case-insensitive)
//! - Listing yields the status first, then fields in send order

use std::fmt;

use axum::http::StatusCode;

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// Status line, e.g. `HTTP/1.1 404 Not Found`.
    Status(StatusCode),
    /// Header field, e.g. `Location: /users`.
    Field { name: String, value: String },
}

impl Header {
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Header::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn status(code: StatusCode) -> Self {
        Header::Status(code)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Status(code) => write!(
                f,
                "HTTP/1.1 {} {}",
                code.as_u16(),
                code.canonical_reason().unwrap_or("")
            ),
            Header::Field { name, value } => write!(f, "{}: {}", name, value),
        }
    }
}

/// Destination of response headers.
pub trait HeaderSink {
    /// Send a header. Ignored once headers are committed.
    fn send(&mut self, header: Header);

    /// True once headers were committed to the client.
    fn sent(&self) -> bool;

    /// Headers sent so far, status first.
    fn list(&self) -> Vec<Header>;

    /// Forget every uncommitted header.
    fn remove_all(&mut self);
}

/// In-memory header buffer, committed once by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    status: Option<StatusCode>,
    fields: Vec<(String, String)>,
    committed: bool,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the headers as sent. Later sends are ignored.
    pub fn commit(&mut self) {
        self.committed = true;
    }

    /// Status to respond with; 200 when none was sent.
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl HeaderSink for HeaderSet {
    fn send(&mut self, header: Header) {
        if self.committed {
            tracing::warn!(header = %header, "Header sent after commit, ignoring");
            return;
        }
        match header {
            Header::Status(code) => self.status = Some(code),
            Header::Field { name, value } => {
                self.fields.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
                self.fields.push((name, value));
            }
        }
    }

    fn sent(&self) -> bool {
        self.committed
    }

    fn list(&self) -> Vec<Header> {
        self.status
            .map(Header::Status)
            .into_iter()
            .chain(self.fields.iter().map(|(n, v)| Header::field(n.clone(), v.clone())))
            .collect()
    }

    fn remove_all(&mut self) {
        if self.committed {
            return;
        }
        self.status = None;
        self.fields.clear();
    }
}
