//! Severity-tagged diagnostic output
//!
//! Exactly one sink is active per ledger, selected at construction:
//! standard error (optionally with ANSI severity colors), an append-mode
//! file stream, a user callback, or nothing. Emission is best-effort; the
//! ledger keeps operating whatever happens to its sink.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::ledger::Site;

/// Message severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Failures and anomalies that need attention.
    Error,
    /// Suspicious but non-fatal conditions.
    Warning,
    /// Ordinary progress information.
    Info,
    /// Per-event records.
    Debug,
}

impl Severity {
    /// Log-line label.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Info => "\x1b[34m",
            Severity::Debug => "\x1b[36m",
        }
    }
}

const ANSI_RESET: &str = "\x1b[0m";

/// Callback sink signature: `(severity, site, message)`.
pub type SinkCallback = Box<dyn Fn(Severity, Option<Site>, &str) + Send + Sync>;

/// Output medium for ledger diagnostics.
pub enum Sink {
    /// Discard everything.
    Null,
    /// Write to standard error.
    Stderr {
        /// Color the severity label with ANSI escapes.
        colors: bool,
    },
    /// Append to a file stream, flushed per line.
    File(Mutex<BufWriter<File>>),
    /// Hand each message to a user-supplied callback.
    Callback(SinkCallback),
}

impl Sink {
    /// Open `path` in append mode as a file sink.
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Sink::File(Mutex::new(BufWriter::new(file))))
    }

    /// Wrap a callback as a sink.
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(Severity, Option<Site>, &str) + Send + Sync + 'static,
    {
        Sink::Callback(Box::new(callback))
    }

    /// Emit one message.
    pub fn emit(&self, severity: Severity, site: Option<Site>, message: &str) {
        match self {
            Sink::Null => {}
            Sink::Stderr { colors } => {
                let label = severity.label();
                match (*colors, site) {
                    (true, Some(site)) => eprintln!(
                        "{}{label}{ANSI_RESET}:{site}: {message}",
                        severity.color()
                    ),
                    (true, None) => {
                        eprintln!("{}{label}{ANSI_RESET}: {message}", severity.color())
                    }
                    (false, Some(site)) => eprintln!("{label}:{site}: {message}"),
                    (false, None) => eprintln!("{label}: {message}"),
                }
            }
            Sink::File(writer) => {
                let mut writer = writer.lock();
                let result = match site {
                    Some(site) => writeln!(writer, "{}:{site}: {message}", severity.label()),
                    None => writeln!(writer, "{}: {message}", severity.label()),
                };
                let _ = result.and_then(|()| writer.flush());
            }
            Sink::Callback(callback) => callback(severity, site, message),
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::Null
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Null => f.write_str("Null"),
            Sink::Stderr { colors } => f.debug_struct("Stderr").field("colors", colors).finish(),
            Sink::File(_) => f.write_str("File(..)"),
            Sink::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}
