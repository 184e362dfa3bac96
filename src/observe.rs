//! Synchronous listener registry shared by the table store and the event log.

use std::fmt;

/// Handle returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// Ordered list of callbacks notified in-line on the caller's thread.
///
/// Callbacks are invoked in registration order. A panicking callback is not
/// caught: it unwinds into the caller of [`Listeners::notify`] and the
/// remaining callbacks are skipped.
pub struct Listeners<T: ?Sized> {
    next_id: u64,
    callbacks: Vec<(ListenerId, Callback<T>)>,
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    /// Appends a callback and returns a handle that can later remove it.
    pub fn add(&mut self, callback: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Removes the callback registered under `id`. Returns `false` when no
    /// such callback exists.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != id);
        self.callbacks.len() != before
    }

    /// Invokes every callback with `value`.
    pub fn notify(&mut self, value: &T) {
        for (_, callback) in &mut self.callbacks {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn callbacks_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<str> = Listeners::new();
        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            listeners.add(move |value: &str| seen.borrow_mut().push(format!("{tag}:{value}")));
        }

        listeners.notify("x");

        assert_eq!(*seen.borrow(), vec!["first:x", "second:x", "third:x"]);
    }

    #[test]
    fn removed_callbacks_are_not_notified() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners: Listeners<u32> = Listeners::new();
        let counter = Rc::clone(&count);
        let id = listeners.add(move |_| *counter.borrow_mut() += 1);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.notify(&7);

        assert_eq!(*count.borrow(), 0);
        assert!(listeners.is_empty());
    }
}
