#![forbid(unsafe_code)]

//! Shared handles for view-model-owned callbacks.
//!
//! Reactive members never own the callbacks they run — they hold `Weak`
//! pointers, and the view-model keeps the strong handle for as long as the
//! callback should stay wired. Once the handle is dropped, every operation
//! that would have used it falls back silently: a lapsed read hook yields the
//! raw value, a lapsed guard blocks invocation, a lapsed action is a no-op.
//!
//! The constructor functions below exist so call sites get the unsized
//! coercion to `Rc<dyn Fn…>` without a type annotation:
//!
//! ```
//! use axon::{read_hook, Property};
//!
//! let doubled = read_hook(|v: &i32| v * 2);
//! let n = Property::builder(21).read_hook(&doubled).build();
//! assert_eq!(n.get(), 42);
//! ```

use std::rc::Rc;

/// Presentational transform applied on every read of a property.
pub type ReadHook<T> = Rc<dyn Fn(&T) -> T>;

/// Side-effect hook fired after a property write changes the stored value.
pub type WriteHook<T> = Rc<dyn Fn(&T)>;

/// Parameterless command action.
pub type Action = Rc<dyn Fn()>;

/// Command action taking a parameter.
pub type ActionWith<P> = Rc<dyn Fn(&P)>;

/// Executability predicate for a parameterless command.
pub type Guard = Rc<dyn Fn() -> bool>;

/// Executability predicate for a parameterful command.
pub type GuardWith<P> = Rc<dyn Fn(&P) -> bool>;

/// Wrap a read transform in a shared handle.
#[must_use]
pub fn read_hook<T>(f: impl Fn(&T) -> T + 'static) -> ReadHook<T> {
    Rc::new(f)
}

/// Wrap a write hook in a shared handle.
#[must_use]
pub fn write_hook<T>(f: impl Fn(&T) + 'static) -> WriteHook<T> {
    Rc::new(f)
}

/// Wrap a parameterless action in a shared handle.
#[must_use]
pub fn action(f: impl Fn() + 'static) -> Action {
    Rc::new(f)
}

/// Wrap a parameterful action in a shared handle.
#[must_use]
pub fn action_with<P>(f: impl Fn(&P) + 'static) -> ActionWith<P> {
    Rc::new(f)
}

/// Wrap a parameterless guard in a shared handle.
#[must_use]
pub fn guard(f: impl Fn() -> bool + 'static) -> Guard {
    Rc::new(f)
}

/// Wrap a parameterful guard in a shared handle.
#[must_use]
pub fn guard_with<P>(f: impl Fn(&P) -> bool + 'static) -> GuardWith<P> {
    Rc::new(f)
}
