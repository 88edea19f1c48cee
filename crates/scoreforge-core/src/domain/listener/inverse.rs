//! Inverse relation shadow variable listener.

use super::change::{write_shadow_if_changed, VariableChangeSink};
use super::traits::ListVariableListener;
use crate::domain::descriptor::{ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor};

/// Keeps each element pointing at the entity whose list holds it.
pub struct InverseRelationListener<S> {
    list: ListVariableDescriptor<S>,
    shadow: ShadowVariableDescriptor<S>,
}

impl<S> InverseRelationListener<S> {
    pub fn new(list: ListVariableDescriptor<S>, shadow: ShadowVariableDescriptor<S>) -> Self {
        Self { list, shadow }
    }

    fn assign_range(
        &self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        from_index: usize,
        to_index: usize,
    ) {
        let len = self.list.list_len(sink.working_solution(), entity);
        for i in from_index..to_index.min(len) {
            let element = self.list.element(sink.working_solution(), entity, i);
            write_shadow_if_changed(sink, &self.list, &self.shadow, element, Some(entity));
        }
    }
}

impl<S> ListVariableListener<S> for InverseRelationListener<S> {
    fn source_variable(&self) -> ListVariableId {
        self.list.id
    }

    fn after_entity_added(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        self.assign_range(sink, entity, 0, usize::MAX);
    }

    fn before_entity_removed(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        for element in self.list.elements(sink.working_solution(), entity) {
            write_shadow_if_changed(sink, &self.list, &self.shadow, element, None);
        }
    }

    fn after_element_added(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    ) {
        self.assign_range(sink, entity, index, index + 1);
    }

    fn after_element_removed(
        &mut self,
        _sink: &mut dyn VariableChangeSink<S>,
        _entity: usize,
        _index: usize,
    ) {
        // The element is either unassigned or added elsewhere; both notify separately.
    }

    fn after_element_unassigned(&mut self, sink: &mut dyn VariableChangeSink<S>, element: usize) {
        write_shadow_if_changed(sink, &self.list, &self.shadow, element, None);
    }

    fn after_list_variable_changed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        from_index: usize,
        to_index: usize,
    ) {
        self.assign_range(sink, entity, from_index, to_index);
    }
}
