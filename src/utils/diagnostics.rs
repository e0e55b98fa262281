//! Diagnostics sink injected into the ranker, evaluator and pipeline

use std::cell::RefCell;

use console::style;

use super::styling::{print_info, WARN};

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Receiver for progress and failure messages.
///
/// Messages about a failing unit carry the selection method and, where
/// relevant, the k value, metric and classifier that failed.
pub trait Diagnostics {
    fn emit(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }
}

/// Styled terminal output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics {
    /// Drop informational messages, keep warnings and errors
    pub quiet: bool,
}

impl ConsoleDiagnostics {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Diagnostics for ConsoleDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Info if self.quiet => {}
            Level::Info => print_info(message),
            Level::Warn => eprintln!("    {}{}", WARN, style(message).yellow()),
            Level::Error => eprintln!(
                "    {} {}",
                style("✗").red().bold(),
                style(message).red()
            ),
        }
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: RefCell<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.borrow().iter().any(|(l, _)| *l == Level::Error)
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}
