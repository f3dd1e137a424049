#![forbid(unsafe_code)]

//! Weak-reference registry and group fan-out coordination.
//!
//! # Design
//!
//! A [`ReactiveContext`] records weak handles to attached values and
//! commands. It owns nothing: once the view-model drops its last strong
//! handle, the entry lapses and fan-out silently skips it. Lapsed entries are
//! never compacted — they persist as no-ops, which trades a little list
//! growth for never having a detach operation at all.
//!
//! Fan-out is keyed on the group name each member carries. Group comparison
//! is exact string equality, so the default empty group is itself a group:
//! ungrouped members fan out to each other. That quirk is deliberate and
//! pinned by tests.
//!
//! # Invariants
//!
//! 1. `notify_group` order: origin first, then same-group values in
//!    attachment order, then same-group commands in attachment order.
//! 2. The origin is excluded from the value pass by [`MemberId`], never
//!    notified twice.
//! 3. Live members are collected before any callback runs, so subscribers
//!    may attach further members re-entrantly.
//! 4. Attachment is append-only and does not dedup; attaching a member twice
//!    doubles its fan-out notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::member::{AsReactiveCommand, AsReactiveValue, ReactiveCommand, ReactiveValue};

/// Coordinator for group-based change notification.
///
/// Typically one per view-model. Accumulates weak attachments for its
/// lifetime.
#[derive(Default)]
pub struct ReactiveContext {
    values: RefCell<Vec<Weak<dyn ReactiveValue>>>,
    commands: RefCell<Vec<Weak<dyn ReactiveCommand>>>,
}

impl ReactiveContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value for group fan-out. Weakly held; no dedup.
    pub fn attach_value(&self, value: &impl AsReactiveValue) {
        let value = value.as_reactive_value();
        trace!(group = value.group(), "attach value");
        self.values.borrow_mut().push(Rc::downgrade(&value));
    }

    /// Attach a command for group fan-out. Weakly held; no dedup.
    pub fn attach_command(&self, command: &impl AsReactiveCommand) {
        let command = command.as_reactive_command();
        trace!(group = command.group(), "attach command");
        self.commands.borrow_mut().push(Rc::downgrade(&command));
    }

    /// Attach every reactive member a host declares, values before commands.
    ///
    /// Members the host registered through the `maybe_*` collectors and left
    /// unset are skipped silently.
    pub fn attach_all(&self, host: &impl ReactiveHost) {
        let mut members = Members::default();
        host.reactive_members(&mut members);
        trace!(
            values = members.values.len(),
            commands = members.commands.len(),
            "attach all"
        );

        let mut values = self.values.borrow_mut();
        for value in &members.values {
            values.push(Rc::downgrade(value));
        }
        drop(values);

        let mut commands = self.commands.borrow_mut();
        for command in &members.commands {
            commands.push(Rc::downgrade(command));
        }
    }

    /// Force-notify `origin`, then (unless `propagate` is `false`) fan out to
    /// every attached member sharing its group: values first, commands
    /// after, each in attachment order. The origin itself is notified exactly
    /// once.
    pub fn notify_group(&self, origin: &impl AsReactiveValue, propagate: bool) {
        let origin = origin.as_reactive_value();
        origin.force_notify();

        if !propagate {
            return;
        }

        let group = origin.group().to_owned();
        let origin_id = origin.member_id();

        // Snapshot live members up front: a notification callback may attach
        // new members or drop existing ones while we iterate.
        let related_values: Vec<Rc<dyn ReactiveValue>> = self
            .values
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|value| value.member_id() != origin_id && value.group() == group)
            .collect();
        let related_commands: Vec<Rc<dyn ReactiveCommand>> = self
            .commands
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|command| command.group() == group)
            .collect();

        trace!(
            group = %group,
            values = related_values.len(),
            commands = related_commands.len(),
            "group fan-out"
        );

        for value in related_values {
            value.force_notify();
        }
        for command in related_commands {
            command.notify_can_invoke();
        }
    }

    /// Force-notify every attached value that is still alive, regardless of
    /// group.
    pub fn notify_all_values(&self) {
        let live: Vec<Rc<dyn ReactiveValue>> =
            self.values.borrow().iter().filter_map(Weak::upgrade).collect();
        for value in live {
            value.force_notify();
        }
    }

    /// Recompute executability on every attached command that is still
    /// alive, regardless of group.
    pub fn notify_all_commands(&self) {
        let live: Vec<Rc<dyn ReactiveCommand>> = self
            .commands
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for command in live {
            command.notify_can_invoke();
        }
    }
}

impl std::fmt::Debug for ReactiveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveContext")
            .field("values", &self.values.borrow().len())
            .field("commands", &self.commands.borrow().len())
            .finish()
    }
}

/// A view-model whose reactive members can be attached in bulk.
///
/// Implementations declare their members once; callers use
/// [`ReactiveContext::attach_all`] and never enumerate members by hand:
///
/// ```
/// use axon::{Members, Property, ReactiveContext, ReactiveHost};
///
/// struct Scores {
///     total: Property<u32>,
///     best: Property<u32>,
/// }
///
/// impl ReactiveHost for Scores {
///     fn reactive_members(&self, members: &mut Members) {
///         members.value(&self.total).value(&self.best);
///     }
/// }
///
/// let scores = Scores { total: Property::new(0), best: Property::new(0) };
/// let context = ReactiveContext::new();
/// context.attach_all(&scores);
/// ```
pub trait ReactiveHost {
    /// Register every reactive member with the collector.
    fn reactive_members(&self, members: &mut Members);
}

/// Collector for [`ReactiveHost`] registration.
#[derive(Default)]
pub struct Members {
    values: Vec<Rc<dyn ReactiveValue>>,
    commands: Vec<Rc<dyn ReactiveCommand>>,
}

impl Members {
    /// Register a value member.
    pub fn value(&mut self, value: &impl AsReactiveValue) -> &mut Self {
        self.values.push(value.as_reactive_value());
        self
    }

    /// Register a command member.
    pub fn command(&mut self, command: &impl AsReactiveCommand) -> &mut Self {
        self.commands.push(command.as_reactive_command());
        self
    }

    /// Register a value member that may not be initialized yet. `None` is
    /// skipped silently.
    pub fn maybe_value<V: AsReactiveValue>(&mut self, value: Option<&V>) -> &mut Self {
        if let Some(value) = value {
            self.values.push(value.as_reactive_value());
        }
        self
    }

    /// Register a command member that may not be initialized yet. `None` is
    /// skipped silently.
    pub fn maybe_command<C: AsReactiveCommand>(&mut self, command: Option<&C>) -> &mut Self {
        if let Some(command) = command {
            self.commands.push(command.as_reactive_command());
        }
        self
    }
}

impl std::fmt::Debug for Members {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Members")
            .field("values", &self.values.len())
            .field("commands", &self.commands.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::hook::action;
    use crate::property::Property;
    use std::cell::Cell;

    fn counter(property: &Property<i32>) -> (Rc<Cell<u32>>, crate::Subscription) {
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let sub = property.subscribe(move || c.set(c.get() + 1));
        (count, sub)
    }

    #[test]
    fn notify_group_fans_out_once_per_member() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        let b = Property::builder(0).group("g").build();
        let act = action(|| {});
        let c = Command::builder(&act).group("g").build();

        context.attach_value(&a);
        context.attach_value(&b);
        context.attach_command(&c);

        let (a_count, _sa) = counter(&a);
        let (b_count, _sb) = counter(&b);
        let c_count = Rc::new(Cell::new(0u32));
        let cc = Rc::clone(&c_count);
        let _sc = c.subscribe_can_invoke(move || cc.set(cc.get() + 1));

        context.notify_group(&a, true);

        // Origin once (not double-counted as related), B once, C once.
        assert_eq!(a_count.get(), 1);
        assert_eq!(b_count.get(), 1);
        assert_eq!(c_count.get(), 1);
    }

    #[test]
    fn notify_group_without_propagation() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        let b = Property::builder(0).group("g").build();
        context.attach_value(&a);
        context.attach_value(&b);

        let (a_count, _sa) = counter(&a);
        let (b_count, _sb) = counter(&b);

        context.notify_group(&a, false);
        assert_eq!(a_count.get(), 1);
        assert_eq!(b_count.get(), 0);
    }

    #[test]
    fn other_groups_are_untouched() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        let other = Property::builder(0).group("h").build();
        context.attach_value(&a);
        context.attach_value(&other);

        let (other_count, _s) = counter(&other);
        context.notify_group(&a, true);
        assert_eq!(other_count.get(), 0);
    }

    #[test]
    fn empty_group_members_fan_out_together() {
        // The default empty group is literally compared, so ungrouped
        // members form one implicit group.
        let context = ReactiveContext::new();
        let a = Property::new(0);
        let b = Property::new(0);
        context.attach_value(&a);
        context.attach_value(&b);

        let (b_count, _s) = counter(&b);
        context.notify_group(&a, true);
        assert_eq!(b_count.get(), 1);
    }

    #[test]
    fn origin_need_not_be_attached() {
        let context = ReactiveContext::new();
        let attached = Property::builder(0).group("g").build();
        context.attach_value(&attached);

        let free = Property::builder(0).group("g").build();
        let (free_count, _sf) = counter(&free);
        let (attached_count, _sa) = counter(&attached);

        context.notify_group(&free, true);
        assert_eq!(free_count.get(), 1);
        assert_eq!(attached_count.get(), 1);
    }

    #[test]
    fn duplicate_attachment_doubles_fan_out() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        let b = Property::builder(0).group("g").build();
        context.attach_value(&a);
        context.attach_value(&b);
        context.attach_value(&b);

        let (b_count, _s) = counter(&b);
        context.notify_group(&a, true);
        assert_eq!(b_count.get(), 2);
    }

    #[test]
    fn lapsed_values_are_skipped() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        context.attach_value(&a);

        {
            let transient = Property::builder(0).group("g").build();
            context.attach_value(&transient);
        }

        // The lapsed entry must not panic or fire anything.
        context.notify_group(&a, true);
        context.notify_all_values();
    }

    #[test]
    fn notify_all_values_ignores_groups() {
        let context = ReactiveContext::new();
        let a = Property::builder(0).group("g").build();
        let b = Property::builder(0).group("h").build();
        context.attach_value(&a);
        context.attach_value(&b);

        let (a_count, _sa) = counter(&a);
        let (b_count, _sb) = counter(&b);

        context.notify_all_values();
        assert_eq!(a_count.get(), 1);
        assert_eq!(b_count.get(), 1);
    }

    #[test]
    fn notify_all_commands_ignores_groups() {
        let context = ReactiveContext::new();
        let act = action(|| {});
        let a = Command::builder(&act).group("g").build();
        let b = Command::new(&act);
        context.attach_command(&a);
        context.attach_command(&b);

        let count = Rc::new(Cell::new(0u32));
        let c1 = Rc::clone(&count);
        let _s1 = a.subscribe_can_invoke(move || c1.set(c1.get() + 1));
        let c2 = Rc::clone(&count);
        let _s2 = b.subscribe_can_invoke(move || c2.set(c2.get() + 1));

        context.notify_all_commands();
        assert_eq!(count.get(), 2);
    }

    struct Host {
        first: Property<i32>,
        second: Property<String>,
        run: Command,
        pending: Option<Property<i32>>,
        // Unrelated state, never attached.
        _label: String,
        _limit: u32,
    }

    impl ReactiveHost for Host {
        fn reactive_members(&self, members: &mut Members) {
            members
                .value(&self.first)
                .value(&self.second)
                .maybe_value(self.pending.as_ref())
                .command(&self.run);
        }
    }

    #[test]
    fn attach_all_attaches_exactly_the_reactive_members() {
        let context = ReactiveContext::new();
        let act = action(|| {});
        let host = Host {
            first: Property::new(0),
            second: Property::new(String::new()),
            run: Command::new(&act),
            pending: None,
            _label: "ignored".to_string(),
            _limit: 3,
        };

        context.attach_all(&host);
        assert_eq!(context.values.borrow().len(), 2);
        assert_eq!(context.commands.borrow().len(), 1);

        let (first_count, _s1) = counter(&host.first);
        let count2 = Rc::new(Cell::new(0u32));
        let c2 = Rc::clone(&count2);
        let _s2 = host.second.subscribe(move || c2.set(c2.get() + 1));

        context.notify_all_values();
        assert_eq!(first_count.get(), 1);
        assert_eq!(count2.get(), 1);
    }

    #[test]
    fn attach_all_includes_initialized_optional_members() {
        let context = ReactiveContext::new();
        let act = action(|| {});
        let host = Host {
            first: Property::new(0),
            second: Property::new(String::new()),
            run: Command::new(&act),
            pending: Some(Property::new(5)),
            _label: String::new(),
            _limit: 0,
        };

        context.attach_all(&host);
        assert_eq!(context.values.borrow().len(), 3);
    }

    #[test]
    fn fan_out_notifies_values_before_commands() {
        let context = ReactiveContext::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = Property::builder(0).group("g").build();
        let b = Property::builder(0).group("g").build();
        let act = action(|| {});
        let cmd = Command::builder(&act).group("g").build();

        // Commands attached before values; fan-out must still run values
        // first.
        context.attach_command(&cmd);
        context.attach_value(&a);
        context.attach_value(&b);

        let o = Rc::clone(&order);
        let _sb = b.subscribe(move || o.borrow_mut().push("value"));
        let o = Rc::clone(&order);
        let _sc = cmd.subscribe_can_invoke(move || o.borrow_mut().push("command"));

        context.notify_group(&a, true);
        assert_eq!(*order.borrow(), vec!["value", "command"]);
    }
}
