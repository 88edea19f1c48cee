//! Fluent constraint stream API.
//!
//! Constraints are declared against a [`ConstraintFactory`]:
//!
//! ```
//! use scoreforge_core::{ClassId, HardSoftScore};
//! use scoreforge_scoring::stream::{joiner, ConstraintFactory, Value};
//!
//! const SHIFT: ClassId = ClassId(0);
//!
//! struct Roster {
//!     employee_of: Vec<Option<usize>>,
//! }
//!
//! let factory = ConstraintFactory::<Roster, HardSoftScore>::new();
//! let employee = |r: &Roster, v: &Value| {
//!     v.as_fact().map_or(Value::None, |f| Value::from(r.employee_of[f.index]))
//! };
//!
//! factory
//!     .for_each(SHIFT)
//!     .join(factory.for_each(SHIFT), joiner::equal(employee))
//!     .filter(|_: &Roster, a: &Value, b: &Value| a < b)
//!     .penalize(HardSoftScore::ONE_HARD)
//!     .as_constraint("Double booking");
//!
//! // for_each, join, filter and scoring
//! assert_eq!(factory.stream_count(), 4);
//! ```

pub mod collector;
pub mod joiner;

mod bi_stream;
mod constraint;
mod definition;
mod factory;
mod uni_stream;
mod value;

#[cfg(test)]
mod tests;

pub use bi_stream::BiConstraintStream;
pub use collector::Collector;
pub use constraint::{ConstraintBuilder, ConstraintWeight};
pub use definition::{
    BiPredicate, BiWeigher, ExistenceMode, StreamId, StreamKey, UniMapper, UniPredicate, UniWeigher,
    WeightExtractor,
};
pub use factory::ConstraintFactory;
pub use joiner::Joiner;
pub use uni_stream::UniConstraintStream;
pub use value::{Tuple, Value};

pub(crate) use constraint::ConstraintDef;
pub(crate) use definition::{StreamDef, StreamOp, TuplePredicate, TupleMapper, TupleWeigher};
