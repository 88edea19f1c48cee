// Collectors aggregate the tuples of a group.

use std::sync::Arc;

use super::definition::closure_key;
use super::value::Value;

pub type Extractor<S> = Arc<dyn Fn(&S, &Value) -> i64 + Send + Sync>;

/// Aggregation applied to every group of a `group_by`.
///
/// Each tuple contributes an integer; the aggregate is the sum of the
/// contributions of the group's current members. Contributions are
/// remembered per tuple, so retracting never re-reads the solution.
pub enum Collector<S> {
    /// Number of tuples in the group.
    Count,
    /// Sum of an extracted integer.
    Sum(Extractor<S>),
}

/// Content key of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKey {
    Count,
    Sum(usize),
}

// Creates a collector that counts tuples.
pub fn count<S>() -> Collector<S> {
    Collector::Count
}

// Creates a collector that sums an integer extracted from each tuple.
pub fn sum<S, F>(extractor: F) -> Collector<S>
where
    F: Fn(&S, &Value) -> i64 + Send + Sync + 'static,
{
    Collector::Sum(Arc::new(extractor))
}

// Like `sum`, with an extractor that other groups may share.
pub fn sum_shared<S>(extractor: Extractor<S>) -> Collector<S> {
    Collector::Sum(extractor)
}

impl<S> Collector<S> {
    pub fn key(&self) -> CollectorKey {
        match self {
            Collector::Count => CollectorKey::Count,
            Collector::Sum(f) => CollectorKey::Sum(closure_key(f)),
        }
    }

    /// What one tuple adds to its group's aggregate.
    #[inline]
    pub fn contribution(&self, solution: &S, value: &Value) -> i64 {
        match self {
            Collector::Count => 1,
            Collector::Sum(f) => f(solution, value),
        }
    }
}

impl<S> Clone for Collector<S> {
    fn clone(&self) -> Self {
        match self {
            Collector::Count => Collector::Count,
            Collector::Sum(f) => Collector::Sum(Arc::clone(f)),
        }
    }
}
