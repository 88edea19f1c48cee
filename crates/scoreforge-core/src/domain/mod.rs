//! Domain model for planning problems
//!
//! The domain is described by an explicit schema rather than by runtime
//! inspection:
//! - `SolutionDescriptor`: fact classes, their hierarchy, decision variables
//!   and shadow variables, validated once when built
//! - `FactRef`: how the scoring network addresses a fact in the working solution
//! - `listener`: the listeners that keep shadow variables consistent

mod descriptor;
mod fact;
pub mod listener;
mod traits;
mod variable;

pub use descriptor::{
    BasicVariableDescriptor, ClassDescriptor, ClassKind, ListVariableDescriptor, ListVariableId,
    ShadowVariableDescriptor, SolutionDescriptor, SolutionDescriptorBuilder,
};
pub use fact::{ClassId, FactRef};
pub use listener::{
    IndexListener, InverseRelationListener, ListVariableListener, ListVariableNotification,
    NextElementListener, PreviousElementListener, VariableChange, VariableChangeSink,
    VariableListenerSupport,
};
pub use traits::PlanningSolution;
pub use variable::{ShadowVariableKind, VariableType};
