#![forbid(unsafe_code)]

//! Weak observer lists backing change and executability notifications.
//!
//! # Design
//!
//! Every reactive member owns a [`Subscribers`] list. Callbacks are stored as
//! `Weak` function pointers; the strong `Rc` lives inside the
//! [`Subscription`] guard returned to the caller. Dropping the guard lapses
//! the entry, and lapsed entries are cleaned up lazily during the next
//! notification pass.
//!
//! # Invariants
//!
//! 1. Callbacks are invoked in subscription order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. Notification is re-entrancy safe: live callbacks are collected before
//!    any of them runs, so a callback may subscribe again without a borrow
//!    panic.
//! 4. A notification carries no payload; subscribers re-read whatever state
//!    they care about.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// RAII guard for a registered callback.
///
/// The guard owns the only strong reference to the callback. Dropping it
/// unsubscribes; [`forget`](Subscription::forget) keeps the callback alive
/// for the rest of the process.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    _callback: Rc<dyn Fn()>,
}

impl Subscription {
    /// Keep the callback registered for the life of the process.
    ///
    /// Intended for application-lifetime subscribers where holding the guard
    /// is just noise. The callback is leaked.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Ordered list of weakly-held notification callbacks.
#[derive(Default)]
pub(crate) struct Subscribers {
    entries: RefCell<Vec<Weak<dyn Fn()>>>,
}

impl Subscribers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a callback. The returned guard owns the strong reference.
    pub(crate) fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        self.entries.borrow_mut().push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Invoke every live callback in subscription order.
    ///
    /// Lapsed entries are removed first. Live callbacks are upgraded into a
    /// local list before invocation so re-entrant subscriptions cannot
    /// observe a held borrow.
    pub(crate) fn notify(&self) {
        let live: Vec<Rc<dyn Fn()>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|entry| entry.strong_count() > 0);
            entries.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback();
        }
    }

    /// Drop every registered callback. Outstanding [`Subscription`] guards
    /// stay valid but will never fire again.
    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
