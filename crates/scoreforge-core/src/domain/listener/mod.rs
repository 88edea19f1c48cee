//! Listeners that keep shadow variables consistent with their source list.
//!
//! # Protocol
//!
//! The score director forwards list mutations to [`VariableListenerSupport`]:
//! "before" notifications are delivered immediately, "after" notifications
//! are queued and delivered by `trigger`. Every shadow write a listener
//! performs is wrapped in a [`VariableChange`], whose creation and drop
//! report the change to the director, so the scoring network sees the
//! element update.
//!
//! Writes are skipped when the shadow already holds the computed value,
//! except for whole-entity additions and removals.

mod change;
mod index;
mod inverse;
mod next;
mod previous;
mod support;
mod traits;

pub use change::{VariableChange, VariableChangeSink};
pub use index::IndexListener;
pub use inverse::InverseRelationListener;
pub use next::NextElementListener;
pub use previous::PreviousElementListener;
pub use support::VariableListenerSupport;
pub use traits::{ListVariableListener, ListVariableNotification};
