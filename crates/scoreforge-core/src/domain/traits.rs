//! Core domain traits

use crate::score::Score;

/// A planning solution: the problem facts, the planning entities and the score.
///
/// # Example
///
/// ```
/// use scoreforge_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone)]
/// struct NQueens {
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for NQueens {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
///
///     fn uninitialized_variable_count(&self) -> usize {
///         self.rows.iter().filter(|r| r.is_none()).count()
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// Solutions must be `Send + Sync` so independent sessions can score
/// clones of the same solution on separate threads.
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: Score;

    /// Returns the last calculated score, if any.
    fn score(&self) -> Option<Self::Score>;

    /// Sets the score of this solution.
    fn set_score(&mut self, score: Option<Self::Score>);

    /// Number of genuine variables still unassigned; negated into the init score.
    fn uninitialized_variable_count(&self) -> usize {
        0
    }

    /// The init score: zero when initialized, negative otherwise.
    fn init_score(&self) -> i32 {
        -(self.uninitialized_variable_count().min(i32::MAX as usize) as i32)
    }
}
