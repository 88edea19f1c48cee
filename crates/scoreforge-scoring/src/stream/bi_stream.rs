// Streams of value pairs.

use std::sync::Arc;

use scoreforge_core::score::Score;
use scoreforge_core::ImpactType;

use super::constraint::{ConstraintBuilder, ConstraintWeight};
use super::definition::{
    closure_key, BiPredicate, BiWeigher, StreamId, StreamKey, StreamOp, TuplePredicate,
    TupleWeigher,
};
use super::factory::ConstraintFactory;
use super::value::Value;

// A stream whose tuples hold two values.
//
// Produced by `join` (left value, right value) and by `group_by`
// (group key, aggregate).
//
// # Example
//
// ```
// use scoreforge_core::{ClassId, SimpleScore};
// use scoreforge_scoring::stream::{collector, ConstraintFactory, Value};
//
// let factory = ConstraintFactory::<(), SimpleScore>::new();
// factory
//     .for_each(ClassId(0))
//     .group_by(|_: &(), _: &Value| Value::None, collector::count())
//     .filter(|_: &(), _key: &Value, count: &Value| count.as_int() > Some(3))
//     .penalize_with(SimpleScore::of(1), |_: &(), _: &Value, count: &Value| {
//         count.as_int().unwrap_or(0) - 3
//     })
//     .as_constraint("At most three");
// ```
pub struct BiConstraintStream<'f, S, Sc: Score> {
    factory: &'f ConstraintFactory<S, Sc>,
    id: StreamId,
}

impl<S, Sc: Score> Clone for BiConstraintStream<'_, S, Sc> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, Sc: Score> Copy for BiConstraintStream<'_, S, Sc> {}

impl<'f, S, Sc> BiConstraintStream<'f, S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    pub(crate) fn new(factory: &'f ConstraintFactory<S, Sc>, id: StreamId) -> Self {
        Self { factory, id }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    // Keeps the pairs for which `predicate` holds.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&S, &Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.filter_shared(Arc::new(predicate))
    }

    pub fn filter_shared(self, predicate: BiPredicate<S>) -> Self {
        let key = StreamKey::Filter {
            parent: self.id,
            predicate: closure_key(&predicate),
        };
        let predicate: TuplePredicate<S> =
            Arc::new(move |s: &S, t: &[Value]| predicate(s, &t[0], &t[1]));
        let op = StreamOp::Filter {
            parent: self.id,
            predicate,
        };
        let id = self
            .factory
            .with_inner(|inner| inner.share_attached(key, op));
        Self::new(self.factory, id)
    }

    pub fn penalize(self, weight: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Penalty, ConstraintWeight::Fixed(weight), None)
    }

    pub fn reward(self, weight: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Reward, ConstraintWeight::Fixed(weight), None)
    }

    // Penalizes each match by `weight` times `weigher`'s result.
    pub fn penalize_with<W>(self, weight: Sc, weigher: W) -> ConstraintBuilder<'f, S, Sc>
    where
        W: Fn(&S, &Value, &Value) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Penalty,
            ConstraintWeight::Fixed(weight),
            Some(Self::erase_weigher(Arc::new(weigher))),
        )
    }

    pub fn reward_with<W>(self, weight: Sc, weigher: W) -> ConstraintBuilder<'f, S, Sc>
    where
        W: Fn(&S, &Value, &Value) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Reward,
            ConstraintWeight::Fixed(weight),
            Some(Self::erase_weigher(Arc::new(weigher))),
        )
    }

    pub fn penalize_configurable(self, default: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Penalty, ConstraintWeight::Configurable(default), None)
    }

    pub fn reward_configurable(self, default: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Reward, ConstraintWeight::Configurable(default), None)
    }

    pub fn penalize_from_solution<E>(self, extractor: E) -> ConstraintBuilder<'f, S, Sc>
    where
        E: Fn(&S) -> Sc + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Penalty,
            ConstraintWeight::Extracted(Arc::new(extractor)),
            None,
        )
    }

    pub fn reward_from_solution<E>(self, extractor: E) -> ConstraintBuilder<'f, S, Sc>
    where
        E: Fn(&S) -> Sc + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Reward,
            ConstraintWeight::Extracted(Arc::new(extractor)),
            None,
        )
    }

    fn impact(
        self,
        impact: ImpactType,
        weight: ConstraintWeight<S, Sc>,
        weigher: Option<TupleWeigher<S>>,
    ) -> ConstraintBuilder<'f, S, Sc> {
        ConstraintBuilder::new(self.factory, self.id, impact, weight, weigher)
    }

    fn erase_weigher(weigher: BiWeigher<S>) -> TupleWeigher<S> {
        Arc::new(move |s: &S, t: &[Value]| weigher(s, &t[0], &t[1]))
    }
}
