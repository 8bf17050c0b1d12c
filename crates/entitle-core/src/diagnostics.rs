//! User-facing messages emitted during an update.

use std::sync::Mutex;

/// Sink for status messages and fatal user errors.
///
/// A `user_error` is reported right before the invocation aborts; callers
/// still receive the error value and decide how to exit.
pub trait Diagnostics: Send + Sync {
    fn message(&self, text: &str);

    fn user_error(&self, text: &str);
}

/// Routes diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn message(&self, text: &str) {
        tracing::info!("{text}");
    }

    fn user_error(&self, text: &str) {
        tracing::error!("{text}");
    }
}

/// Whether a recorded diagnostic was informational or fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.with_severity(Severity::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_severity(Severity::Error)
    }

    fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn record(&self, severity: Severity, text: &str) {
        self.lock().push((severity, text.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Severity, String)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn message(&self, text: &str) {
        self.record(Severity::Info, text);
    }

    fn user_error(&self, text: &str) {
        self.record(Severity::Error, text);
    }
}
