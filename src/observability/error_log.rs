//! Append-only error log file.
//!
//! Record format:
//! ```text
//! [2026-01-31 12:00:00] Programmer: View 'views/x.html' could not be rendered
//! #0 Programmer: View 'views/x.html' could not be rendered (src/view/mod.rs:240)
//! #1 Programmer: Variable `name` not found in context (src/view/engine.rs:25)
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::error::{Error, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format one log record for `err`.
pub fn format_record(err: &Error) -> String {
    format!(
        "[{}] {}: {}\n{}\n",
        Local::now().format(TIMESTAMP_FORMAT),
        err.kind(),
        err.message(),
        err.trace()
    )
}

/// Append a record for `err` to `path`, creating the file if needed.
pub fn append(path: &Path, err: &Error) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_record(err).as_bytes())?;
    Ok(())
}
