//! Class descriptor.

use std::fmt;

use crate::domain::fact::ClassId;

/// What role a class plays in the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Immutable input data.
    ProblemFact,
    /// Carries decision or shadow variables.
    Entity,
    /// Never instantiated; exists so streams can select all of its subclasses.
    Abstract,
}

/// Describes one class of facts.
///
/// Concrete classes carry a counter that reports how many facts of the class
/// the working solution holds; the facts are addressed `0..count`.
pub struct ClassDescriptor<S> {
    pub id: ClassId,
    pub name: &'static str,
    pub parent: Option<ClassId>,
    pub kind: ClassKind,
    pub(crate) counter: Option<fn(&S) -> usize>,
}

impl<S> ClassDescriptor<S> {
    /// Number of facts of exactly this class in the solution.
    pub fn count(&self, solution: &S) -> usize {
        self.counter.map_or(0, |count| count(solution))
    }

    pub fn is_entity(&self) -> bool {
        self.kind == ClassKind::Entity
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Abstract
    }
}

impl<S> Clone for ClassDescriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ClassDescriptor<S> {}

impl<S> fmt::Debug for ClassDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("kind", &self.kind)
            .finish()
    }
}
