//! Runtime descriptors for the solution schema.

mod class;
mod solution;
mod variable;

#[cfg(test)]
mod tests;

pub use class::{ClassDescriptor, ClassKind};
pub use solution::{SolutionDescriptor, SolutionDescriptorBuilder};
pub use variable::{
    BasicVariableDescriptor, ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor,
};
