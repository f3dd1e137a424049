#![forbid(unsafe_code)]

//! Typed observable values with two write paths.
//!
//! # Design
//!
//! [`Property<T>`] is a cloneable handle to a shared cell
//! (`Rc<PropertyInner<T>>`). It distinguishes the write that a two-way UI
//! binding performs ([`write`](Property::write)) from the write that
//! application code performs ([`set`](Property::set) /
//! [`set_with`](Property::set_with)); each path has its own optional
//! side-effect hook and its own auto-notify flag. A third hook transforms the
//! value on every read without ever touching the stored value.
//!
//! Hooks are held weakly — the view-model keeps the strong [`crate::hook`]
//! handle. A lapsed hook is a silent fallback, never an error.
//!
//! # Invariants
//!
//! 1. Writing a value equal (`PartialEq`) to the stored value is a complete
//!    no-op on both paths: no hook fires, no notification is emitted.
//! 2. The read transform is purely presentational; the stored value is
//!    unaffected by any number of reads.
//! 3. `set_with` computes the replacement from the raw stored value, not the
//!    read-transformed one.
//! 4. Hooks run after the store, so a hook observing the property sees the
//!    new value.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::hook::{ReadHook, WriteHook};
use crate::member::{AsReactiveValue, MemberId, ReactiveValue};
use crate::subscription::{Subscribers, Subscription};

struct PropertyInner<T> {
    id: MemberId,
    group: String,
    value: RefCell<T>,
    read_hook: Option<Weak<dyn Fn(&T) -> T>>,
    ui_hook: Option<Weak<dyn Fn(&T)>>,
    set_hook: Option<Weak<dyn Fn(&T)>>,
    notify_on_write: bool,
    notify_on_set: bool,
    changed: Subscribers,
}

impl<T: 'static> ReactiveValue for PropertyInner<T> {
    fn member_id(&self) -> MemberId {
        self.id
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn force_notify(&self) {
        self.changed.notify();
    }
}

/// A single typed reactive value.
///
/// Cloning the handle shares the same underlying cell. The handle alone keeps
/// the cell alive; a [`crate::ReactiveContext`] holds it only weakly.
pub struct Property<T: 'static> {
    inner: Rc<PropertyInner<T>>,
}

impl<T: 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.inner.id)
            .field("group", &self.inner.group)
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

impl<T: 'static> Property<T> {
    /// Create a property with default configuration: empty group, no hooks,
    /// notification enabled on both write paths.
    pub fn new(initial: T) -> Self {
        Self::builder(initial).build()
    }

    /// Start configuring a property.
    pub fn builder(initial: T) -> PropertyBuilder<T> {
        PropertyBuilder {
            initial,
            group: String::new(),
            read_hook: None,
            ui_hook: None,
            set_hook: None,
            notify_on_write: true,
            notify_on_set: true,
        }
    }

    /// Group name for coordinator fan-out.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// Identity of this property.
    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.inner.id
    }

    /// Emit a change notification unconditionally, bypassing equality checks
    /// and hooks. Used for manual refresh and by coordinator fan-out.
    pub fn force_notify(&self) {
        self.inner.changed.notify();
    }

    /// Subscribe to change notifications. The notification carries no
    /// payload; read the property for the current value.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.changed.subscribe(callback)
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Current value, passed through the read transform when one is
    /// configured and still live. Side-effect free.
    #[must_use]
    pub fn get(&self) -> T {
        let raw = self.inner.value.borrow().clone();
        match self.inner.read_hook.as_ref().and_then(Weak::upgrade) {
            Some(hook) => hook(&raw),
            None => raw,
        }
    }

    /// UI-originated write (the two-way-binding path).
    ///
    /// No-op when `value` equals the stored value. Otherwise stores, fires
    /// the UI hook if live, and notifies subscribers if the write-path
    /// notify flag is set.
    pub fn write(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        let hook = self.inner.ui_hook.as_ref().and_then(Weak::upgrade);
        self.commit(value, hook, self.inner.notify_on_write);
    }

    /// Code-originated write.
    ///
    /// Same equality short-circuit as [`write`](Self::write), but fires the
    /// set hook and honors the set-path notify flag.
    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        let hook = self.inner.set_hook.as_ref().and_then(Weak::upgrade);
        self.commit(value, hook, self.inner.notify_on_set);
    }

    /// Code-originated write computed from the current raw value.
    ///
    /// The closure receives the stored value, never the read-transformed
    /// one. The result goes through the same short-circuit and hook behavior
    /// as [`set`](Self::set).
    pub fn set_with(&self, f: impl FnOnce(&T) -> T) {
        let new_value = {
            let current = self.inner.value.borrow();
            f(&current)
        };
        self.set(new_value);
    }

    fn commit(&self, value: T, hook: Option<Rc<dyn Fn(&T)>>, notify: bool) {
        *self.inner.value.borrow_mut() = value;
        if let Some(hook) = hook {
            // Hooks see the stored value; clone so no borrow is held while
            // the hook runs (it may write back into this property).
            let stored = self.inner.value.borrow().clone();
            hook(&stored);
        }
        if notify {
            self.inner.changed.notify();
        }
    }
}

impl<T: 'static> AsReactiveValue for Property<T> {
    fn as_reactive_value(&self) -> Rc<dyn ReactiveValue> {
        Rc::clone(&self.inner) as Rc<dyn ReactiveValue>
    }
}

/// Configuration for a [`Property`].
pub struct PropertyBuilder<T> {
    initial: T,
    group: String,
    read_hook: Option<Weak<dyn Fn(&T) -> T>>,
    ui_hook: Option<Weak<dyn Fn(&T)>>,
    set_hook: Option<Weak<dyn Fn(&T)>>,
    notify_on_write: bool,
    notify_on_set: bool,
}

impl<T: 'static> PropertyBuilder<T> {
    /// Tag the property with a fan-out group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Transform applied on every read. Held weakly; the caller keeps the
    /// strong handle.
    #[must_use]
    pub fn read_hook(mut self, hook: &ReadHook<T>) -> Self {
        self.read_hook = Some(Rc::downgrade(hook));
        self
    }

    /// Hook fired after a UI-originated write changes the value.
    #[must_use]
    pub fn ui_hook(mut self, hook: &WriteHook<T>) -> Self {
        self.ui_hook = Some(Rc::downgrade(hook));
        self
    }

    /// Hook fired after a code-originated write changes the value.
    #[must_use]
    pub fn set_hook(mut self, hook: &WriteHook<T>) -> Self {
        self.set_hook = Some(Rc::downgrade(hook));
        self
    }

    /// Whether a UI-originated write auto-notifies subscribers. Default
    /// `true`.
    #[must_use]
    pub fn notify_on_write(mut self, notify: bool) -> Self {
        self.notify_on_write = notify;
        self
    }

    /// Whether a code-originated write auto-notifies subscribers. Default
    /// `true`.
    #[must_use]
    pub fn notify_on_set(mut self, notify: bool) -> Self {
        self.notify_on_set = notify;
        self
    }

    /// Finish configuration.
    pub fn build(self) -> Property<T> {
        Property {
            inner: Rc::new(PropertyInner {
                id: MemberId::next(),
                group: self.group,
                value: RefCell::new(self.initial),
                read_hook: self.read_hook,
                ui_hook: self.ui_hook,
                set_hook: self.set_hook,
                notify_on_write: self.notify_on_write,
                notify_on_set: self.notify_on_set,
                changed: Subscribers::new(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
