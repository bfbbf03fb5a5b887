//! The output console shown under the editor.
//!
//! Entries are kept for display and mirrored to the `log` facade so they also
//! show up in the terminal when `RUST_LOG` is set.

use crate::validate::Warning;
use chrono::{DateTime, Local};

/// Upper bound on retained entries; the oldest are dropped first.
const MAX_ENTRIES: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Success,
    Warn,
    Error,
}

impl Level {
    pub const fn label(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct LogEntry {
    pub(crate) level: Level,
    pub(crate) message: String,
    pub(crate) at: DateTime<Local>,
}

impl LogEntry {
    /// Wall-clock time for display, e.g. `14:03:07`.
    pub fn time(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

#[derive(Default)]
pub(crate) struct Console {
    entries: Vec<LogEntry>,
    /// Set when an error arrives; the UI uses it to pop the console open.
    pub(crate) wants_attention: bool,
}

impl Console {
    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Info | Level::Success => log::info!("{message}"),
            Level::Warn => log::warn!("{message}"),
            Level::Error => {
                log::error!("{message}");
                self.wants_attention = true;
            }
        }
        self.entries.push(LogEntry {
            level,
            message,
            at: Local::now(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Logs the outcome of a validation run over `name`. Problems are
    /// errors, so a failing run asks for the console.
    pub fn report_analysis(&mut self, name: &str, warnings: &[Warning]) {
        self.info(format!("Running analysis for {name}..."));
        for warning in warnings {
            self.error(warning.to_string());
        }
        if warnings.is_empty() {
            self.success("Syntax check passed: script looks good!");
        } else {
            self.error(format!(
                "Analysis failed: {} problem(s) found.",
                warnings.len()
            ));
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.wants_attention = false;
    }
}
