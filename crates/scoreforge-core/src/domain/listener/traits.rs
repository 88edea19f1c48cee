//! List variable listener trait and notifications.

use super::change::VariableChangeSink;
use crate::domain::descriptor::ListVariableId;

/// A listener that maintains one shadow variable of one list variable.
///
/// Entities and elements are indices; `from_index` is inclusive and
/// `to_index` exclusive. Listeners read the list through the sink's
/// working solution, which already reflects the change for "after" calls.
pub trait ListVariableListener<S>: Send + Sync {
    /// The list variable this listener is sourced from.
    fn source_variable(&self) -> ListVariableId;

    /// The whole list of a new entity appeared.
    fn after_entity_added(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize);

    /// The entity and its list are about to disappear.
    fn before_entity_removed(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize);

    /// One element was inserted at `index`.
    fn after_element_added(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    );

    /// One element was removed from `index`; the list no longer contains it.
    fn after_element_removed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    );

    /// An element left every list.
    fn after_element_unassigned(&mut self, sink: &mut dyn VariableChangeSink<S>, element: usize);

    fn before_list_variable_changed(
        &mut self,
        _sink: &mut dyn VariableChangeSink<S>,
        _entity: usize,
        _from_index: usize,
        _to_index: usize,
    ) {
    }

    /// Elements in `[from_index, to_index)` changed.
    fn after_list_variable_changed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        from_index: usize,
        to_index: usize,
    );

    /// Called when the working solution is replaced.
    fn reset_working_solution(&mut self, _solution: &S) {}
}

/// A queued "after" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListVariableNotification {
    EntityAdded {
        list_variable: ListVariableId,
        entity: usize,
    },
    ElementAdded {
        list_variable: ListVariableId,
        entity: usize,
        index: usize,
    },
    ElementRemoved {
        list_variable: ListVariableId,
        entity: usize,
        index: usize,
    },
    ElementUnassigned {
        list_variable: ListVariableId,
        element: usize,
    },
    RangeChanged {
        list_variable: ListVariableId,
        entity: usize,
        from_index: usize,
        to_index: usize,
    },
}

impl ListVariableNotification {
    pub fn list_variable(&self) -> ListVariableId {
        match *self {
            ListVariableNotification::EntityAdded { list_variable, .. }
            | ListVariableNotification::ElementAdded { list_variable, .. }
            | ListVariableNotification::ElementRemoved { list_variable, .. }
            | ListVariableNotification::ElementUnassigned { list_variable, .. }
            | ListVariableNotification::RangeChanged { list_variable, .. } => list_variable,
        }
    }

    /// Delivers this notification to one listener.
    pub fn deliver<S>(
        &self,
        listener: &mut dyn ListVariableListener<S>,
        sink: &mut dyn VariableChangeSink<S>,
    ) {
        match *self {
            ListVariableNotification::EntityAdded { entity, .. } => {
                listener.after_entity_added(sink, entity)
            }
            ListVariableNotification::ElementAdded { entity, index, .. } => {
                listener.after_element_added(sink, entity, index)
            }
            ListVariableNotification::ElementRemoved { entity, index, .. } => {
                listener.after_element_removed(sink, entity, index)
            }
            ListVariableNotification::ElementUnassigned { element, .. } => {
                listener.after_element_unassigned(sink, element)
            }
            ListVariableNotification::RangeChanged {
                entity,
                from_index,
                to_index,
                ..
            } => listener.after_list_variable_changed(sink, entity, from_index, to_index),
        }
    }
}
