//! Index shadow variable listener.

use super::change::{write_shadow_if_changed, VariableChangeSink};
use super::traits::ListVariableListener;
use crate::domain::descriptor::{ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor};

/// Keeps `element[i].index == i`.
pub struct IndexListener<S> {
    list: ListVariableDescriptor<S>,
    shadow: ShadowVariableDescriptor<S>,
}

impl<S> IndexListener<S> {
    pub fn new(list: ListVariableDescriptor<S>, shadow: ShadowVariableDescriptor<S>) -> Self {
        Self { list, shadow }
    }

    /// Renumbers from `from_index`; past `to_index` the first index that is
    /// already correct ends the walk, because the list length did not shift
    /// anything beyond it.
    fn update_indexes(
        &self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        from_index: usize,
        to_index: usize,
    ) {
        let len = self.list.list_len(sink.working_solution(), entity);
        for i in from_index..len {
            let solution = sink.working_solution();
            let element = self.list.element(solution, entity, i);
            if self.shadow.value(solution, element) == Some(i) {
                if i >= to_index {
                    break;
                }
                continue;
            }
            write_shadow_if_changed(sink, &self.list, &self.shadow, element, Some(i));
        }
    }
}

impl<S> ListVariableListener<S> for IndexListener<S> {
    fn source_variable(&self) -> ListVariableId {
        self.list.id
    }

    fn after_entity_added(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        self.update_indexes(sink, entity, 0, usize::MAX);
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
        self.update_indexes(sink, entity, index, index + 1);
    }

    fn after_element_removed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    ) {
        self.update_indexes(sink, entity, index, index);
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
        self.update_indexes(sink, entity, from_index, to_index);
    }
}
