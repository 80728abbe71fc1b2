//! Vellum Engine
//!
//! The document lifecycle state machine:
//!
//! ```text
//! Draft ──submit──▶ UnderReview ──sign × n──▶ Approved ──release──▶ Effective
//!   ▲                                                                  │
//!   └──────────────────────── draft new version ◀──────────────────────┘
//! ```
//!
//! A new version can be drafted from any state. `PendingApproval` and
//! `Obsolete` exist in the state model but no operation here produces them.

mod action;
mod engine;
mod error;
mod events;

pub use action::{NextAction, next_action};
pub use engine::{LifecycleEngine, QUALITY_UNIT};
pub use error::{ErrorKind, LifecycleError, Transition};
pub use events::{ChannelNotifier, LifecycleEvent, LifecycleNotifier, NoopNotifier};
