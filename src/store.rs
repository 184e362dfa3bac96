use tracing::debug;

use crate::error::Result;
use crate::model::Table;
use crate::observe::{ListenerId, Listeners};

/// Holds the most recently loaded table and notifies listeners whenever it is
/// replaced.
#[derive(Debug, Default)]
pub struct TableStore {
    table: Option<Table>,
    listeners: Listeners<Option<Table>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current table, if any.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Replaces the held table with the outcome of a parse.
    ///
    /// A failure clears the table. Listeners are notified in both cases,
    /// after the state has changed; the failure is then handed back.
    pub fn set_result(&mut self, result: Result<Table>) -> Result<()> {
        match result {
            Ok(table) => {
                self.replace(Some(table));
                Ok(())
            }
            Err(err) => {
                self.replace(None);
                Err(err)
            }
        }
    }

    /// Drops the held table and notifies listeners.
    pub fn clear(&mut self) {
        self.replace(None);
    }

    /// Registers a callback that receives the new state on every update.
    pub fn add_listener(&mut self, listener: impl FnMut(&Option<Table>) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn replace(&mut self, table: Option<Table>) {
        debug!(
            present = table.is_some(),
            listeners = self.listeners.len(),
            "table state replaced"
        );
        self.table = table;
        self.listeners.notify(&self.table);
    }
}
