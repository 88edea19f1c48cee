//! Previous element shadow variable listener.

use super::change::{write_shadow, write_shadow_if_changed, VariableChangeSink};
use super::traits::ListVariableListener;
use crate::domain::descriptor::{ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor};

/// Keeps `element[i].previous == element[i - 1]` for every list of the source variable.
pub struct PreviousElementListener<S> {
    list: ListVariableDescriptor<S>,
    shadow: ShadowVariableDescriptor<S>,
}

impl<S> PreviousElementListener<S> {
    pub fn new(list: ListVariableDescriptor<S>, shadow: ShadowVariableDescriptor<S>) -> Self {
        Self { list, shadow }
    }
}

impl<S> ListVariableListener<S> for PreviousElementListener<S> {
    fn source_variable(&self) -> ListVariableId {
        self.list.id
    }

    fn after_entity_added(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        let elements = self.list.elements(sink.working_solution(), entity);
        if let Some(&first) = elements.first() {
            write_shadow_if_changed(sink, &self.list, &self.shadow, first, None);
        }
        for pair in elements.windows(2) {
            write_shadow(sink, &self.list, &self.shadow, pair[1], Some(pair[0]));
        }
    }

    fn before_entity_removed(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        let elements = self.list.elements(sink.working_solution(), entity);
        // The first element already points nowhere.
        for &element in elements.iter().skip(1) {
            write_shadow(sink, &self.list, &self.shadow, element, None);
        }
    }

    fn after_element_added(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    ) {
        let solution = sink.working_solution();
        let len = self.list.list_len(solution, entity);
        let element = self.list.element(solution, entity, index);
        let previous = (index > 0).then(|| self.list.element(solution, entity, index - 1));
        let next = (index + 1 < len).then(|| self.list.element(solution, entity, index + 1));

        write_shadow_if_changed(sink, &self.list, &self.shadow, element, previous);
        if let Some(next) = next {
            write_shadow_if_changed(sink, &self.list, &self.shadow, next, Some(element));
        }
    }

    fn after_element_removed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    ) {
        let solution = sink.working_solution();
        if index >= self.list.list_len(solution, entity) {
            return;
        }
        let successor = self.list.element(solution, entity, index);
        let previous = (index > 0).then(|| self.list.element(solution, entity, index - 1));
        write_shadow_if_changed(sink, &self.list, &self.shadow, successor, previous);
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
        let solution = sink.working_solution();
        let len = self.list.list_len(solution, entity);
        let mut previous = (from_index > 0 && from_index <= len)
            .then(|| self.list.element(solution, entity, from_index - 1));
        // Walk forward over [from_index, to_index]; nothing outside it can change.
        for i in from_index..=to_index {
            if i >= len {
                break;
            }
            let element = self.list.element(sink.working_solution(), entity, i);
            write_shadow_if_changed(sink, &self.list, &self.shadow, element, previous);
            previous = Some(element);
        }
    }
}
