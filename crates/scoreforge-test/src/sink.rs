//! A recording [`VariableChangeSink`].

use scoreforge_core::domain::{FactRef, VariableChangeSink};

/// One notification seen by [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    Before(FactRef, &'static str),
    After(FactRef, &'static str),
}

/// Owns a solution and logs every before/after notification in order.
///
/// # Example
///
/// ```
/// use scoreforge_core::domain::{ClassId, FactRef, VariableChange};
/// use scoreforge_test::sink::{ChangeEvent, RecordingSink};
///
/// let mut sink = RecordingSink::new(vec![1, 2, 3]);
/// let fact = FactRef::new(ClassId(0), 1);
/// VariableChange::begin(&mut sink, fact, "value").solution_mut()[1] = 20;
/// assert_eq!(sink.solution, vec![1, 20, 3]);
/// assert_eq!(
///     sink.events,
///     vec![ChangeEvent::Before(fact, "value"), ChangeEvent::After(fact, "value")]
/// );
/// ```
#[derive(Debug)]
pub struct RecordingSink<S> {
    pub solution: S,
    pub events: Vec<ChangeEvent>,
}

impl<S> RecordingSink<S> {
    pub fn new(solution: S) -> Self {
        Self {
            solution,
            events: Vec::new(),
        }
    }

    /// Facts that received an "after" notification, in order.
    pub fn changed_facts(&self) -> Vec<FactRef> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChangeEvent::After(fact, _) => Some(*fact),
                ChangeEvent::Before(..) => None,
            })
            .collect()
    }

    /// True if every "before" is immediately followed by its matching "after".
    pub fn is_balanced(&self) -> bool {
        self.events.len() % 2 == 0
            && self.events.chunks(2).all(|pair| match pair {
                [ChangeEvent::Before(a, x), ChangeEvent::After(b, y)] => a == b && x == y,
                _ => false,
            })
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl<S> VariableChangeSink<S> for RecordingSink<S> {
    fn working_solution(&self) -> &S {
        &self.solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.solution
    }

    fn before_variable_changed(&mut self, entity: FactRef, variable_name: &'static str) {
        self.events.push(ChangeEvent::Before(entity, variable_name));
    }

    fn after_variable_changed(&mut self, entity: FactRef, variable_name: &'static str) {
        self.events.push(ChangeEvent::After(entity, variable_name));
    }
}
