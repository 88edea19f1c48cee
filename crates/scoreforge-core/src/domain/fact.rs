//! Fact addressing.

use std::fmt;

/// Identifies a class in a [`SolutionDescriptor`](super::SolutionDescriptor).
///
/// Ids are assigned in registration order, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassId(pub usize);

/// Reference to one fact of the working solution.
///
/// A fact is addressed by its concrete class and its index in that class's
/// collection. A session keys its tuples by this position. Inserting or
/// removing a fact anywhere but at the end of a collection moves the facts
/// behind it; the score director re-evaluates the moved positions, while a
/// bare session expects the caller to update them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactRef {
    pub class: ClassId,
    pub index: usize,
}

impl FactRef {
    #[inline]
    pub const fn new(class: ClassId, index: usize) -> Self {
        Self { class, index }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

impl fmt::Display for FactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.class, self.index)
    }
}
