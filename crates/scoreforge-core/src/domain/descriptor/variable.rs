//! Variable descriptors.

use std::fmt;

use crate::domain::fact::{ClassId, FactRef};
use crate::domain::variable::ShadowVariableKind;

/// Index of a list variable in its [`SolutionDescriptor`](super::SolutionDescriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListVariableId(pub usize);

/// A genuine variable holding a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicVariableDescriptor {
    pub name: &'static str,
    pub entity_class: ClassId,
}

/// A genuine variable holding an ordered list of element indices.
///
/// `len(solution, entity)` and `element_at(solution, entity, position)`
/// read the list of the entity with the given index; elements are indices
/// into the collection of `element_class`.
pub struct ListVariableDescriptor<S> {
    pub id: ListVariableId,
    pub name: &'static str,
    pub entity_class: ClassId,
    pub element_class: ClassId,
    pub(crate) len: fn(&S, usize) -> usize,
    pub(crate) element_at: fn(&S, usize, usize) -> usize,
}

impl<S> ListVariableDescriptor<S> {
    #[inline]
    pub fn list_len(&self, solution: &S, entity: usize) -> usize {
        (self.len)(solution, entity)
    }

    #[inline]
    pub fn element(&self, solution: &S, entity: usize, position: usize) -> usize {
        (self.element_at)(solution, entity, position)
    }

    /// Reads the whole list of one entity.
    pub fn elements(&self, solution: &S, entity: usize) -> Vec<usize> {
        (0..self.list_len(solution, entity))
            .map(|i| self.element(solution, entity, i))
            .collect()
    }

    #[inline]
    pub fn entity_ref(&self, entity: usize) -> FactRef {
        FactRef::new(self.entity_class, entity)
    }

    #[inline]
    pub fn element_ref(&self, element: usize) -> FactRef {
        FactRef::new(self.element_class, element)
    }
}

impl<S> Clone for ListVariableDescriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ListVariableDescriptor<S> {}

impl<S> fmt::Debug for ListVariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListVariableDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entity_class", &self.entity_class)
            .field("element_class", &self.element_class)
            .finish()
    }
}

/// A shadow variable on the elements of a list variable.
///
/// All supported kinds hold an optional index: the neighbouring element for
/// next/previous, the position for index, and the owning entity for inverse
/// relation. Only listeners call `set`.
pub struct ShadowVariableDescriptor<S> {
    pub name: &'static str,
    pub kind: ShadowVariableKind,
    pub owner_class: ClassId,
    pub declared_class: Option<ClassId>,
    pub source: ListVariableId,
    pub(crate) get: fn(&S, usize) -> Option<usize>,
    pub(crate) set: fn(&mut S, usize, Option<usize>),
}

impl<S> ShadowVariableDescriptor<S> {
    #[inline]
    pub fn value(&self, solution: &S, element: usize) -> Option<usize> {
        (self.get)(solution, element)
    }

    #[inline]
    pub(crate) fn write(&self, solution: &mut S, element: usize, value: Option<usize>) {
        (self.set)(solution, element, value)
    }
}

impl<S> Clone for ShadowVariableDescriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ShadowVariableDescriptor<S> {}

impl<S> fmt::Debug for ShadowVariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowVariableDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("owner_class", &self.owner_class)
            .field("declared_class", &self.declared_class)
            .field("source", &self.source)
            .finish()
    }
}
