#![forbid(unsafe_code)]

//! Capability contracts between reactive members and the coordinator.
//!
//! The context never depends on a concrete property or command type. It sees
//! two minimal capabilities: "has a group name and can be force-notified"
//! ([`ReactiveValue`]) and "has a group name and can recompute executability"
//! ([`ReactiveCommand`]). Concrete types hand their shared state to the
//! context through the [`AsReactiveValue`] / [`AsReactiveCommand`]
//! conversion traits, which is what lets the context hold only weak
//! references.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MEMBER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token for a reactive member.
///
/// Group fan-out must notify every same-group member except the origin;
/// comparing `MemberId`s is how the origin is excluded. IDs are unique per
/// member for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId(u64);

impl MemberId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MEMBER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A value the coordinator can force-notify.
pub trait ReactiveValue {
    /// Identity used for self-exclusion during fan-out.
    fn member_id(&self) -> MemberId;

    /// Group name. Compared by exact string equality; the default empty
    /// string is itself a group.
    fn group(&self) -> &str;

    /// Emit a change notification unconditionally.
    fn force_notify(&self);
}

/// A command the coordinator can ask to recompute executability.
pub trait ReactiveCommand {
    /// Identity of this command.
    fn member_id(&self) -> MemberId;

    /// Group name, compared by exact string equality.
    fn group(&self) -> &str;

    /// Emit an executability-changed notification unconditionally.
    fn notify_can_invoke(&self);
}

/// Conversion into the shared value capability.
pub trait AsReactiveValue {
    /// Shared handle to this member's state, suitable for weak attachment.
    fn as_reactive_value(&self) -> Rc<dyn ReactiveValue>;
}

/// Conversion into the shared command capability.
pub trait AsReactiveCommand {
    /// Shared handle to this member's state, suitable for weak attachment.
    fn as_reactive_command(&self) -> Rc<dyn ReactiveCommand>;
}
