//! Leveled diagnostics injected into every reconciliation call.

use std::cell::RefCell;

/// Log target used for informational and warning records.
pub const DEFAULT_TARGET: &str = "DefaultLogger";
/// Log target used for error records.
pub const ERROR_TARGET: &str = "ErrorLogger";

/// Structured, leveled diagnostics.
///
/// Implementations must not fail: diagnostics are side effects only and never
/// alter the outcome of a run.
pub trait DiagnosticLog {
    /// Record progress information.
    fn info(&self, message: &str);
    /// Record data drift that does not stop the run.
    fn warning(&self, message: &str);
    /// Record a failure or an audited difference.
    fn error(&self, message: &str);
}

/// Forwards diagnostics to the [`log`] facade.
///
/// Info and warning records use the [`DEFAULT_TARGET`] target; errors use
/// [`ERROR_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl DiagnosticLog for LogFacade {
    fn info(&self, message: &str) {
        log::info!(target: DEFAULT_TARGET, "{message}");
    }

    fn warning(&self, message: &str) {
        log::warn!(target: DEFAULT_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: ERROR_TARGET, "{message}");
    }
}

/// Severity of a [`RecordingLog`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational record.
    Info,
    /// Warning record.
    Warning,
    /// Error record.
    Error,
}

/// In-memory [`DiagnosticLog`] capturing every record in call order.
///
/// # Examples
///
/// ```
/// use itinerari_core::{DiagnosticLog, LogLevel, RecordingLog};
///
/// let log = RecordingLog::default();
/// log.warning("drift");
/// assert_eq!(log.count(LogLevel::Warning), 1);
/// assert_eq!(log.messages(LogLevel::Warning), vec!["drift".to_owned()]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    /// Every captured record.
    #[must_use]
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at `level`, in call order.
    #[must_use]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of records at `level`.
    #[must_use]
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .count()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_owned()));
    }
}

impl DiagnosticLog for RecordingLog {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.push(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
