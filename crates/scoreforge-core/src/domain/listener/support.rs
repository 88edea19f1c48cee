//! Registry and notification queue for list variable listeners.

use tracing::trace;

use super::change::VariableChangeSink;
use super::index::IndexListener;
use super::inverse::InverseRelationListener;
use super::next::NextElementListener;
use super::previous::PreviousElementListener;
use super::traits::{ListVariableListener, ListVariableNotification};
use crate::domain::descriptor::{ListVariableId, SolutionDescriptor};
use crate::domain::variable::ShadowVariableKind;

/// Owns the listeners of a score director.
///
/// "Before" notifications are delivered as they arrive. "After"
/// notifications are queued and delivered, in arrival order, by
/// [`trigger`](Self::trigger).
pub struct VariableListenerSupport<S> {
    listeners: Vec<Box<dyn ListVariableListener<S>>>,
    queue: Vec<ListVariableNotification>,
}

impl<S: 'static> VariableListenerSupport<S> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            queue: Vec::new(),
        }
    }

    /// Creates the built-in listener for every shadow variable of the descriptor.
    pub fn from_descriptor(descriptor: &SolutionDescriptor<S>) -> Self {
        let mut support = Self::new();
        for shadow in descriptor.shadow_variables() {
            let Some(&list) = descriptor.list_variable(shadow.source) else {
                continue;
            };
            let shadow = *shadow;
            let listener: Box<dyn ListVariableListener<S>> = match shadow.kind {
                ShadowVariableKind::NextElement => Box::new(NextElementListener::new(list, shadow)),
                ShadowVariableKind::PreviousElement => {
                    Box::new(PreviousElementListener::new(list, shadow))
                }
                ShadowVariableKind::Index => Box::new(IndexListener::new(list, shadow)),
                ShadowVariableKind::InverseRelation => {
                    Box::new(InverseRelationListener::new(list, shadow))
                }
            };
            support.register(listener);
        }
        support
    }

    /// Adds a listener, e.g. for a custom shadow variable.
    pub fn register(&mut self, listener: Box<dyn ListVariableListener<S>>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners_for(&self, list_variable: ListVariableId) -> bool {
        self.listeners
            .iter()
            .any(|l| l.source_variable() == list_variable)
    }

    /// Queues an "after" notification if any listener cares about its variable.
    pub fn notify(&mut self, notification: ListVariableNotification) {
        if self.has_listeners_for(notification.list_variable()) {
            self.queue.push(notification);
        }
    }

    pub fn before_entity_removed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        list_variable: ListVariableId,
        entity: usize,
    ) {
        for listener in self.listeners_for(list_variable) {
            listener.before_entity_removed(sink, entity);
        }
    }

    pub fn before_list_variable_changed(
        &mut self,
        sink: &mut dyn VariableChangeSink<S>,
        list_variable: ListVariableId,
        entity: usize,
        from_index: usize,
        to_index: usize,
    ) {
        for listener in self.listeners_for(list_variable) {
            listener.before_list_variable_changed(sink, entity, from_index, to_index);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Delivers every queued notification; returns how many were delivered.
    pub fn trigger(&mut self, sink: &mut dyn VariableChangeSink<S>) -> usize {
        let queue = std::mem::take(&mut self.queue);
        for notification in &queue {
            for listener in self.listeners_for(notification.list_variable()) {
                notification.deliver(listener.as_mut(), sink);
            }
        }
        if !queue.is_empty() {
            trace!(event = "variable_listeners_triggered", notifications = queue.len());
        }
        queue.len()
    }

    /// Drops queued notifications and resets every listener.
    pub fn reset_working_solution(&mut self, solution: &S) {
        self.queue.clear();
        for listener in &mut self.listeners {
            listener.reset_working_solution(solution);
        }
    }

    fn listeners_for(
        &mut self,
        list_variable: ListVariableId,
    ) -> impl Iterator<Item = &mut Box<dyn ListVariableListener<S>>> + '_ {
        self.listeners
            .iter_mut()
            .filter(move |l| l.source_variable() == list_variable)
    }
}

impl<S: 'static> Default for VariableListenerSupport<S> {
    fn default() -> Self {
        Self::new()
    }
}
