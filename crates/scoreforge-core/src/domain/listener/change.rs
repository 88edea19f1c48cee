//! Scoped before/after change notification.

use std::marker::PhantomData;

use crate::domain::descriptor::{ListVariableDescriptor, ShadowVariableDescriptor};
use crate::domain::fact::FactRef;

/// The side of the score director that listeners write through.
pub trait VariableChangeSink<S> {
    fn working_solution(&self) -> &S;

    /// Mutable access for listeners; every write must sit inside a [`VariableChange`].
    fn working_solution_mut(&mut self) -> &mut S;

    fn before_variable_changed(&mut self, entity: FactRef, variable_name: &'static str);

    fn after_variable_changed(&mut self, entity: FactRef, variable_name: &'static str);
}

/// An open variable change.
///
/// Creating it sends `before_variable_changed`; dropping it sends
/// `after_variable_changed`. The pair can't be unbalanced.
///
/// ```
/// use scoreforge_core::domain::{ClassId, FactRef, VariableChange, VariableChangeSink};
///
/// struct Log {
///     values: Vec<i64>,
///     events: Vec<&'static str>,
/// }
///
/// impl VariableChangeSink<Vec<i64>> for Log {
///     fn working_solution(&self) -> &Vec<i64> { &self.values }
///     fn working_solution_mut(&mut self) -> &mut Vec<i64> { &mut self.values }
///     fn before_variable_changed(&mut self, _: FactRef, _: &'static str) { self.events.push("before") }
///     fn after_variable_changed(&mut self, _: FactRef, _: &'static str) { self.events.push("after") }
/// }
///
/// let mut log = Log { values: vec![0], events: Vec::new() };
/// {
///     let mut change = VariableChange::begin(&mut log, FactRef::new(ClassId(0), 0), "value");
///     change.solution_mut()[0] = 7;
/// }
/// assert_eq!(log.values, vec![7]);
/// assert_eq!(log.events, vec!["before", "after"]);
/// ```
pub struct VariableChange<'a, S, D: ?Sized + VariableChangeSink<S>> {
    sink: &'a mut D,
    entity: FactRef,
    variable_name: &'static str,
    _solution: PhantomData<fn(&S)>,
}

impl<'a, S, D: ?Sized + VariableChangeSink<S>> VariableChange<'a, S, D> {
    pub fn begin(sink: &'a mut D, entity: FactRef, variable_name: &'static str) -> Self {
        sink.before_variable_changed(entity, variable_name);
        Self {
            sink,
            entity,
            variable_name,
            _solution: PhantomData,
        }
    }

    pub fn solution_mut(&mut self) -> &mut S {
        self.sink.working_solution_mut()
    }
}

impl<S, D: ?Sized + VariableChangeSink<S>> Drop for VariableChange<'_, S, D> {
    fn drop(&mut self) {
        self.sink
            .after_variable_changed(self.entity, self.variable_name);
    }
}

/// Writes a shadow value inside a change scope.
pub(crate) fn write_shadow<S>(
    sink: &mut dyn VariableChangeSink<S>,
    list: &ListVariableDescriptor<S>,
    shadow: &ShadowVariableDescriptor<S>,
    element: usize,
    value: Option<usize>,
) {
    let mut change = VariableChange::begin(sink, list.element_ref(element), shadow.name);
    shadow.write(change.solution_mut(), element, value);
}

/// Writes a shadow value unless it already holds `value`.
pub(crate) fn write_shadow_if_changed<S>(
    sink: &mut dyn VariableChangeSink<S>,
    list: &ListVariableDescriptor<S>,
    shadow: &ShadowVariableDescriptor<S>,
    element: usize,
    value: Option<usize>,
) {
    if shadow.value(sink.working_solution(), element) != value {
        write_shadow(sink, list, shadow, element, value);
    }
}
