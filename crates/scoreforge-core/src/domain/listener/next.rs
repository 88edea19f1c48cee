//! Next element shadow variable listener.

use super::change::{write_shadow, write_shadow_if_changed, VariableChangeSink};
use super::traits::ListVariableListener;
use crate::domain::descriptor::{ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor};

/// Keeps `element[i].next == element[i + 1]` for every list of the source variable.
pub struct NextElementListener<S> {
    list: ListVariableDescriptor<S>,
    shadow: ShadowVariableDescriptor<S>,
}

impl<S> NextElementListener<S> {
    pub fn new(list: ListVariableDescriptor<S>, shadow: ShadowVariableDescriptor<S>) -> Self {
        Self { list, shadow }
    }
}

impl<S> ListVariableListener<S> for NextElementListener<S> {
    fn source_variable(&self) -> ListVariableId {
        self.list.id
    }

    fn after_entity_added(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        let elements = self.list.elements(sink.working_solution(), entity);
        for pair in elements.windows(2) {
            write_shadow(sink, &self.list, &self.shadow, pair[0], Some(pair[1]));
        }
        if let Some(&last) = elements.last() {
            write_shadow_if_changed(sink, &self.list, &self.shadow, last, None);
        }
    }

    fn before_entity_removed(&mut self, sink: &mut dyn VariableChangeSink<S>, entity: usize) {
        let elements = self.list.elements(sink.working_solution(), entity);
        // The last element already points nowhere.
        for &element in elements.iter().take(elements.len().saturating_sub(1)) {
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
        let next = (index + 1 < len).then(|| self.list.element(solution, entity, index + 1));
        let previous = (index > 0).then(|| self.list.element(solution, entity, index - 1));

        write_shadow_if_changed(sink, &self.list, &self.shadow, element, next);
        if let Some(previous) = previous {
            write_shadow_if_changed(sink, &self.list, &self.shadow, previous, Some(element));
        }
    }

    fn after_element_removed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        entity: usize,
        index: usize,
    ) {
        if index == 0 {
            return;
        }
        let solution = sink.working_solution();
        let len = self.list.list_len(solution, entity);
        let previous = self.list.element(solution, entity, index - 1);
        let next = (index < len).then(|| self.list.element(solution, entity, index));
        write_shadow_if_changed(sink, &self.list, &self.shadow, previous, next);
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
        let to_index = to_index.min(len);
        let mut next = (to_index < len).then(|| self.list.element(solution, entity, to_index));
        // Walk back over [from_index - 1, to_index); nothing outside it can change.
        let lower = from_index.saturating_sub(1);
        let mut i = to_index;
        while i > lower {
            i -= 1;
            let element = self.list.element(sink.working_solution(), entity, i);
            write_shadow_if_changed(sink, &self.list, &self.shadow, element, next);
            next = Some(element);
        }
    }
}
