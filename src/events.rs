use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::{error, info};

use crate::error::Result;
use crate::observe::{ListenerId, Listeners};

/// Display format of the timestamp that prefixes every log entry.
pub const TIMESTAMP_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

type Clock = Box<dyn Fn() -> NaiveDateTime>;

/// Append-only, user-facing event log.
///
/// Every entry is stored as `"<timestamp> <message>"`. Errors are recorded
/// twice: as a regular entry and, without the timestamp, in a separate error
/// list used by [`EventLog::latest_error`].
pub struct EventLog {
    entries: Vec<String>,
    errors: Vec<String>,
    listeners: Listeners<str>,
    clock: Clock,
}

impl EventLog {
    /// Creates an empty log stamped with the local wall clock.
    pub fn new() -> Self {
        Self::with_clock(|| Local::now().naive_local())
    }

    /// Creates an empty log that takes its timestamps from `clock`.
    pub fn with_clock(clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        Self {
            entries: Vec::new(),
            errors: Vec::new(),
            listeners: Listeners::new(),
            clock: Box::new(clock),
        }
    }

    /// Appends a timestamped entry and notifies listeners with it.
    pub fn log_event(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(target: "xml_sheets::events", "{message}");
        self.append(message);
    }

    /// Logs `message` as an event and records it as the latest error.
    pub fn log_error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        error!(target: "xml_sheets::events", "{message}");
        self.append(message);
        self.errors.push(message.to_string());
    }

    /// Returns the most recent error message, or `""` when none was logged.
    pub fn latest_error(&self) -> &str {
        self.errors.last().map(String::as_str).unwrap_or_default()
    }

    /// Writes all entries to `path`, one per line without a trailing newline,
    /// replacing any existing content. An empty log produces an empty file.
    ///
    /// The save itself is logged afterwards, so that line is not part of the
    /// written file.
    pub fn save_log(&mut self, path: &Path) -> Result<()> {
        fs::write(path, self.entries.join("\n"))?;
        self.log_event(format!("Log saved: {}", path.display()));
        Ok(())
    }

    /// Registers a callback that receives every new entry.
    pub fn add_listener(&mut self, listener: impl FnMut(&str) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Forgets all entries and errors. Listeners stay registered.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.errors.clear();
    }

    fn append(&mut self, message: &str) {
        let timestamp = (self.clock)().format(TIMESTAMP_FORMAT);
        let entry = format!("{timestamp} {message}");
        self.entries.push(entry);
        if let Some(entry) = self.entries.last() {
            self.listeners.notify(entry);
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("entries", &self.entries.len())
            .field("errors", &self.errors.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
