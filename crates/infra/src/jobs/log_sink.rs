//! Append-only text log with a timestamp prefix on every line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// `dd/mm/YYYY-HH:MM:SS`, local time.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y-%H:%M:%S";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A text file that only ever grows. Created on first write.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `"{timestamp} {message}"` as one line.
    pub fn append(&self, timestamp: &str, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{timestamp} {message}")
    }
}
