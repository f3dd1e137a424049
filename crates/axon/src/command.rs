#![forbid(unsafe_code)]

//! Invocable actions gated by an optional executability guard.
//!
//! # Design
//!
//! [`Command`] (parameterless) and [`CommandWith<P>`] (parameterful) hold
//! their action and guard weakly; the view-model owns the strong
//! [`crate::hook`] handles. Executability resolves in three tiers: a command
//! with no guard is always invocable, a live guard decides, and a lapsed
//! guard means permanently blocked — lapsing is how disposal of the owning
//! view-model shows up.
//!
//! [`dispose`](Command::dispose) makes a command inert eagerly: it clears the
//! weak pointers, drops every executability subscriber, and pins
//! `can_invoke` to `false` from then on.
//!
//! # Invariants
//!
//! 1. `invoke` never runs the action while `can_invoke` is `false`, and
//!    never panics over a lapsed action — both are silent no-ops.
//! 2. `dispose` is idempotent and irreversible.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::hook::{Action, ActionWith, Guard, GuardWith};
use crate::member::{AsReactiveCommand, MemberId, ReactiveCommand};
use crate::subscription::{Subscribers, Subscription};

struct CommandInner {
    id: MemberId,
    group: String,
    action: RefCell<Option<Weak<dyn Fn()>>>,
    guard: RefCell<Option<Weak<dyn Fn() -> bool>>>,
    disposed: Cell<bool>,
    can_invoke_changed: Subscribers,
}

impl ReactiveCommand for CommandInner {
    fn member_id(&self) -> MemberId {
        self.id
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn notify_can_invoke(&self) {
        self.can_invoke_changed.notify();
    }
}

/// A parameterless command.
///
/// Cloning the handle shares the same underlying state.
pub struct Command {
    inner: Rc<CommandInner>,
}

impl Clone for Command {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.inner.id)
            .field("group", &self.inner.group)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl Command {
    /// Create a command with no guard and the default (empty) group.
    pub fn new(action: &Action) -> Self {
        Self::builder(action).build()
    }

    /// Start configuring a command.
    pub fn builder(action: &Action) -> CommandBuilder {
        CommandBuilder {
            action: Rc::downgrade(action),
            guard: None,
            group: String::new(),
        }
    }

    /// Group name for coordinator fan-out.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// Identity of this command.
    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.inner.id
    }

    /// Whether the command may currently run.
    ///
    /// `true` when no guard was ever configured; the guard's verdict while it
    /// is live; `false` once the guard has lapsed or the command was
    /// disposed.
    #[must_use]
    pub fn can_invoke(&self) -> bool {
        if self.inner.disposed.get() {
            return false;
        }
        // Release the borrow before running the guard; it may touch this
        // command again.
        let guard = match &*self.inner.guard.borrow() {
            None => return true,
            Some(weak) => weak.upgrade(),
        };
        match guard {
            Some(guard) => guard(),
            None => false,
        }
    }

    /// Run the action if the command is currently invocable. A blocked or
    /// lapsed command is a silent no-op.
    pub fn invoke(&self) {
        if !self.can_invoke() {
            return;
        }
        let action = self.inner.action.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(action) = action {
            action();
        }
    }

    /// Emit an executability-changed notification unconditionally.
    pub fn notify_can_invoke(&self) {
        self.inner.can_invoke_changed.notify();
    }

    /// Subscribe to executability-changed notifications.
    pub fn subscribe_can_invoke(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.can_invoke_changed.subscribe(callback)
    }

    /// Make the command permanently inert: clears the action and guard,
    /// drops all executability subscribers. Idempotent.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        *self.inner.action.borrow_mut() = None;
        *self.inner.guard.borrow_mut() = None;
        self.inner.can_invoke_changed.clear();
    }
}

impl AsReactiveCommand for Command {
    fn as_reactive_command(&self) -> Rc<dyn ReactiveCommand> {
        Rc::clone(&self.inner) as Rc<dyn ReactiveCommand>
    }
}

/// Configuration for a [`Command`].
pub struct CommandBuilder {
    action: Weak<dyn Fn()>,
    guard: Option<Weak<dyn Fn() -> bool>>,
    group: String,
}

impl CommandBuilder {
    /// Gate invocation behind a predicate. Held weakly.
    #[must_use]
    pub fn guard(mut self, guard: &Guard) -> Self {
        self.guard = Some(Rc::downgrade(guard));
        self
    }

    /// Tag the command with a fan-out group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Finish configuration.
    pub fn build(self) -> Command {
        Command {
            inner: Rc::new(CommandInner {
                id: MemberId::next(),
                group: self.group,
                action: RefCell::new(Some(self.action)),
                guard: RefCell::new(self.guard),
                disposed: Cell::new(false),
                can_invoke_changed: Subscribers::new(),
            }),
        }
    }
}

struct CommandWithInner<P> {
    id: MemberId,
    group: String,
    action: RefCell<Option<Weak<dyn Fn(&P)>>>,
    guard: RefCell<Option<Weak<dyn Fn(&P) -> bool>>>,
    disposed: Cell<bool>,
    can_invoke_changed: Subscribers,
}

impl<P: 'static> ReactiveCommand for CommandWithInner<P> {
    fn member_id(&self) -> MemberId {
        self.id
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn notify_can_invoke(&self) {
        self.can_invoke_changed.notify();
    }
}

/// A command whose action and guard take a typed parameter.
pub struct CommandWith<P: 'static> {
    inner: Rc<CommandWithInner<P>>,
}

impl<P: 'static> Clone for CommandWith<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: 'static> std::fmt::Debug for CommandWith<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandWith")
            .field("id", &self.inner.id)
            .field("group", &self.inner.group)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl<P: 'static> CommandWith<P> {
    /// Create a command with no guard and the default (empty) group.
    pub fn new(action: &ActionWith<P>) -> Self {
        Self::builder(action).build()
    }

    /// Start configuring a command.
    pub fn builder(action: &ActionWith<P>) -> CommandWithBuilder<P> {
        CommandWithBuilder {
            action: Rc::downgrade(action),
            guard: None,
            group: String::new(),
        }
    }

    /// Group name for coordinator fan-out.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// Identity of this command.
    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.inner.id
    }

    /// Whether the command may run with the given parameter. Resolution
    /// follows [`Command::can_invoke`].
    #[must_use]
    pub fn can_invoke(&self, param: &P) -> bool {
        if self.inner.disposed.get() {
            return false;
        }
        let guard = match &*self.inner.guard.borrow() {
            None => return true,
            Some(weak) => weak.upgrade(),
        };
        match guard {
            Some(guard) => guard(param),
            None => false,
        }
    }

    /// Run the action with `param` if currently invocable; otherwise a
    /// silent no-op.
    pub fn invoke(&self, param: &P) {
        if !self.can_invoke(param) {
            return;
        }
        let action = self.inner.action.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(action) = action {
            action(param);
        }
    }

    /// Emit an executability-changed notification unconditionally.
    pub fn notify_can_invoke(&self) {
        self.inner.can_invoke_changed.notify();
    }

    /// Subscribe to executability-changed notifications.
    pub fn subscribe_can_invoke(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.can_invoke_changed.subscribe(callback)
    }

    /// Make the command permanently inert. Idempotent.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        *self.inner.action.borrow_mut() = None;
        *self.inner.guard.borrow_mut() = None;
        self.inner.can_invoke_changed.clear();
    }
}

impl<P: 'static> AsReactiveCommand for CommandWith<P> {
    fn as_reactive_command(&self) -> Rc<dyn ReactiveCommand> {
        Rc::clone(&self.inner) as Rc<dyn ReactiveCommand>
    }
}

/// Configuration for a [`CommandWith`].
pub struct CommandWithBuilder<P> {
    action: Weak<dyn Fn(&P)>,
    guard: Option<Weak<dyn Fn(&P) -> bool>>,
    group: String,
}

impl<P: 'static> CommandWithBuilder<P> {
    /// Gate invocation behind a predicate. Held weakly.
    #[must_use]
    pub fn guard(mut self, guard: &GuardWith<P>) -> Self {
        self.guard = Some(Rc::downgrade(guard));
        self
    }

    /// Tag the command with a fan-out group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Finish configuration.
    pub fn build(self) -> CommandWith<P> {
        CommandWith {
            inner: Rc::new(CommandWithInner {
                id: MemberId::next(),
                group: self.group,
                action: RefCell::new(Some(self.action)),
                guard: RefCell::new(self.guard),
                disposed: Cell::new(false),
                can_invoke_changed: Subscribers::new(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{action, action_with, guard, guard_with};

    #[test]
    fn no_guard_is_always_invocable() {
        let run = Rc::new(Cell::new(false));
        let r = Rc::clone(&run);
        let act = action(move || r.set(true));

        let command = Command::new(&act);
        assert!(command.can_invoke());

        command.invoke();
        assert!(run.get());
    }

    #[test]
    fn blocking_guard_suppresses_invoke() {
        let run = Rc::new(Cell::new(false));
        let r = Rc::clone(&run);
        let act = action(move || r.set(true));
        let g = guard(|| false);

        let command = Command::builder(&act).guard(&g).build();
        assert!(!command.can_invoke());

        command.invoke();
        assert!(!run.get());
    }

    #[test]
    fn live_guard_decides() {
        let allowed = Rc::new(Cell::new(false));
        let a = Rc::clone(&allowed);
        let g = guard(move || a.get());
        let act = action(|| {});

        let command = Command::builder(&act).guard(&g).build();
        assert!(!command.can_invoke());

        allowed.set(true);
        assert!(command.can_invoke());
    }

    #[test]
    fn lapsed_guard_blocks_permanently() {
        let act = action(|| {});
        let g = guard(|| true);
        let command = Command::builder(&act).guard(&g).build();
        assert!(command.can_invoke());

        drop(g);
        assert!(!command.can_invoke());
    }

    #[test]
    fn lapsed_action_is_a_silent_no_op() {
        let act = action(|| {});
        let command = Command::new(&act);
        drop(act);

        // Still invocable (no guard), but nothing to run.
        assert!(command.can_invoke());
        command.invoke();
    }

    #[test]
    fn dispose_makes_command_inert() {
        let run = Rc::new(Cell::new(false));
        let r = Rc::clone(&run);
        let act = action(move || r.set(true));
        let command = Command::new(&act);

        let notified = Rc::new(Cell::new(false));
        let n = Rc::clone(&notified);
        let _sub = command.subscribe_can_invoke(move || n.set(true));

        command.dispose();

        assert!(!command.can_invoke());
        command.invoke();
        assert!(!run.get());

        command.notify_can_invoke();
        assert!(!notified.get());

        // Idempotent.
        command.dispose();
        assert!(!command.can_invoke());
    }

    #[test]
    fn notify_can_invoke_reaches_subscribers() {
        let act = action(|| {});
        let command = Command::new(&act);

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = command.subscribe_can_invoke(move || c.set(c.get() + 1));

        command.notify_can_invoke();
        command.notify_can_invoke();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn parameterful_action_receives_param() {
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let act = action_with(move |p: &i32| s.set(*p));

        let command = CommandWith::new(&act);
        command.invoke(&7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn parameterful_guard_sees_param() {
        let run = Rc::new(Cell::new(0u32));
        let r = Rc::clone(&run);
        let act = action_with(move |_: &i32| r.set(r.get() + 1));
        let g = guard_with(|p: &i32| *p > 0);

        let command = CommandWith::builder(&act).guard(&g).build();

        assert!(!command.can_invoke(&0));
        command.invoke(&0);
        assert_eq!(run.get(), 0);

        assert!(command.can_invoke(&3));
        command.invoke(&3);
        assert_eq!(run.get(), 1);
    }

    #[test]
    fn parameterful_dispose() {
        let run = Rc::new(Cell::new(false));
        let r = Rc::clone(&run);
        let act = action_with(move |_: &i32| r.set(true));
        let command = CommandWith::new(&act);

        command.dispose();
        assert!(!command.can_invoke(&1));
        command.invoke(&1);
        assert!(!run.get());
    }

    #[test]
    fn group_defaults_to_empty() {
        let act = action(|| {});
        let command = Command::new(&act);
        assert_eq!(command.group(), "");

        let grouped = Command::builder(&act).group("scores").build();
        assert_eq!(grouped.group(), "scores");
    }

    #[test]
    fn clones_share_disposal() {
        let act = action(|| {});
        let a = Command::new(&act);
        let b = a.clone();
        a.dispose();
        assert!(!b.can_invoke());
    }
}
