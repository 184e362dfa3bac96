use crate::events::EventLog;
use crate::store::TableStore;

/// The state shared by everything that runs during one session: the current
/// table and the event log.
///
/// Construct a fresh session per test for isolation.
#[derive(Debug, Default)]
pub struct Session {
    pub store: TableStore,
    pub log: EventLog,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session around an existing event log, e.g. one with a fixed
    /// clock.
    pub fn with_log(log: EventLog) -> Self {
        Self {
            store: TableStore::new(),
            log,
        }
    }
}
