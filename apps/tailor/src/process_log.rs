//! Process Log — the user-visible, append-only record of pipeline progress.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    System,
    Error,
}

/// A single log line. Never mutated once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub kind: LogKind,
    pub at: DateTime<Utc>,
}

/// Ordered log of status and error messages.
///
/// Only a fresh generation clears it. `viewport` follows the newest entry on
/// every append.
#[derive(Debug, Clone, Default)]
pub struct ProcessLog {
    entries: Vec<LogEntry>,
    viewport: Option<usize>,
}

impl ProcessLog {
    pub fn system(&mut self, text: impl Into<String>) {
        self.append(text.into(), LogKind::System);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.append(text.into(), LogKind::Error);
    }

    fn append(&mut self, text: String, kind: LogKind) {
        tracing::debug!(?kind, "process log: {text}");
        self.entries.push(LogEntry {
            text,
            kind,
            at: Utc::now(),
        });
        self.viewport = Some(self.entries.len() - 1);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.viewport = None;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry the log's viewport is scrolled to.
    pub fn viewport(&self) -> Option<usize> {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_kind() {
        let mut log = ProcessLog::default();
        log.system("Submitting resume for processing...");
        log.error("HTTP error! status: 500");

        let kinds: Vec<_> = log.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::System, LogKind::Error]);
        assert_eq!(log.entries()[0].text, "Submitting resume for processing...");
        assert!(log.entries()[0].at <= log.entries()[1].at);
    }

    #[test]
    fn test_viewport_tracks_newest_entry() {
        let mut log = ProcessLog::default();
        assert_eq!(log.viewport(), None);
        log.system("one");
        log.system("two");
        log.system("three");
        assert_eq!(log.viewport(), Some(2));
    }

    #[test]
    fn test_clear_resets_entries_and_viewport() {
        let mut log = ProcessLog::default();
        log.system("one");
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.viewport(), None);
    }
}
