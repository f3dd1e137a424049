#![forbid(unsafe_code)]

//! Group-reactive properties and commands for view-models.
//!
//! This crate is a small coordination runtime: a view-model exposes typed
//! reactive values ([`Property`]) and guarded actions ([`Command`],
//! [`CommandWith`]), tags related members with a shared group name, and
//! registers them with one [`ReactiveContext`]. Mutating a value notifies its
//! own subscribers; asking the context to [`notify_group`] additionally
//! refreshes every other value and recomputes executability on every command
//! in the same group — without any member holding a reference to another.
//!
//! [`notify_group`]: ReactiveContext::notify_group
//!
//! # Architecture
//!
//! Everything is single-threaded, synchronous, and callback-driven. Handles
//! are `Rc`-backed; the context and every user callback slot hold only
//! `Weak` pointers, so neither the coordinator nor a wired hook can keep a
//! view-model alive. A lapsed weak reference is always a silent fallback,
//! never an error.
//!
//! # Invariants
//!
//! 1. Writing a value equal to the stored value never fires hooks or
//!    notifications.
//! 2. Group fan-out notifies the origin exactly once, then same-group values
//!    and commands in attachment order.
//! 3. Group names compare by exact string equality — the default empty
//!    group is itself a group.
//! 4. A disposed command is permanently inert.
//!
//! # Example
//!
//! ```
//! use axon::{guard, Property, Command, ReactiveContext};
//!
//! let context = ReactiveContext::new();
//! let score = Property::builder(0).group("score").build();
//!
//! let can_reset = {
//!     let score = score.clone();
//!     guard(move || score.get() > 0)
//! };
//! let reset = {
//!     let score = score.clone();
//!     axon::action(move || score.set(0))
//! };
//! let reset_cmd = Command::builder(&reset)
//!     .guard(&can_reset)
//!     .group("score")
//!     .build();
//!
//! context.attach_value(&score);
//! context.attach_command(&reset_cmd);
//!
//! assert!(!reset_cmd.can_invoke());
//! score.set_with(|s| s + 1);
//! context.notify_group(&score, true);
//! assert!(reset_cmd.can_invoke());
//! ```

pub mod command;
pub mod context;
pub mod hook;
pub mod member;
pub mod property;
pub mod subscription;

pub use command::{Command, CommandBuilder, CommandWith, CommandWithBuilder};
pub use context::{Members, ReactiveContext, ReactiveHost};
pub use hook::{
    Action, ActionWith, Guard, GuardWith, ReadHook, WriteHook, action, action_with, guard,
    guard_with, read_hook, write_hook,
};
pub use member::{AsReactiveCommand, AsReactiveValue, MemberId, ReactiveCommand, ReactiveValue};
pub use property::{Property, PropertyBuilder};
pub use subscription::Subscription;
