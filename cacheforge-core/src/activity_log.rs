//! Bounded, newest-first log of user-facing events.

use std::sync::Arc;

use cacheforge_types::{LogEntry, LogLevel};
use tracing::{error, info, warn};

use crate::store::{Publisher, StateReader};

pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Every append is also emitted as a `tracing` event at the entry's level.
#[derive(Debug)]
pub struct ActivityLog {
    entries: Publisher<Vec<LogEntry>>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl ActivityLog {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Publisher::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Info, message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Warn, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogEntry::new(LogLevel::Error, message));
    }

    pub fn push(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => info!(target: "cacheforge::activity", "{}", entry.message),
            LogLevel::Warn => warn!(target: "cacheforge::activity", "{}", entry.message),
            LogLevel::Error => error!(target: "cacheforge::activity", "{}", entry.message),
        }

        let capacity = self.capacity;
        self.entries.replace_with(move |current| {
            let mut next = Vec::with_capacity(capacity.min(current.len() + 1));
            next.push(entry);
            next.extend(current.iter().take(capacity - 1).cloned());
            next
        });
    }

    /// Owned copy, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.current().as_ref().clone()
    }

    pub fn snapshot(&self) -> Arc<Vec<LogEntry>> {
        self.entries.current()
    }

    pub fn reader(&self) -> StateReader<Vec<LogEntry>> {
        self.entries.reader()
    }

    pub fn latest(&self) -> Option<LogEntry> {
        self.entries.current().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
