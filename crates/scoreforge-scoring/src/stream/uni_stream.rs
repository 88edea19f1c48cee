// Streams of single values.

use std::sync::Arc;

use scoreforge_core::score::Score;
use scoreforge_core::ImpactType;

use super::bi_stream::BiConstraintStream;
use super::collector::Collector;
use super::constraint::{ConstraintBuilder, ConstraintWeight};
use super::definition::{
    closure_key, ExistenceMode, StreamId, StreamKey, StreamOp, TupleMapper, TuplePredicate,
    TupleWeigher, UniMapper, UniPredicate, UniWeigher,
};
use super::factory::ConstraintFactory;
use super::joiner::Joiner;
use super::value::Value;

// A stream whose tuples hold one value.
//
// Handles are `Copy`; every operation registers (or finds) a definition in
// the factory and returns a handle to it. Closures passed by value are
// never shared with other streams; pass the same `Arc` to the `*_shared`
// variants to let two constraints reuse one node.
//
// # Example
//
// ```
// use scoreforge_core::{ClassId, SimpleScore};
// use scoreforge_scoring::stream::{ConstraintFactory, Value};
//
// let factory = ConstraintFactory::<Vec<i64>, SimpleScore>::new();
// factory
//     .for_each(ClassId(0))
//     .filter(|values: &Vec<i64>, v: &Value| {
//         v.as_fact().is_some_and(|f| values[f.index] < 0)
//     })
//     .penalize(SimpleScore::of(1))
//     .as_constraint("Negative value");
// assert_eq!(factory.constraint_count(), 1);
// ```
pub struct UniConstraintStream<'f, S, Sc: Score> {
    factory: &'f ConstraintFactory<S, Sc>,
    id: StreamId,
}

impl<S, Sc: Score> Clone for UniConstraintStream<'_, S, Sc> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, Sc: Score> Copy for UniConstraintStream<'_, S, Sc> {}

impl<'f, S, Sc> UniConstraintStream<'f, S, Sc>
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

    // Keeps the values for which `predicate` holds.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&S, &Value) -> bool + Send + Sync + 'static,
    {
        self.filter_shared(Arc::new(predicate))
    }

    pub fn filter_shared(self, predicate: UniPredicate<S>) -> Self {
        let key = StreamKey::Filter {
            parent: self.id,
            predicate: closure_key(&predicate),
        };
        let predicate: TuplePredicate<S> =
            Arc::new(move |s: &S, t: &[Value]| predicate(s, &t[0]));
        self.derive(
            key,
            StreamOp::Filter {
                parent: self.id,
                predicate,
            },
        )
    }

    // Replaces every value with `mapper`'s result.
    pub fn map<F>(self, mapper: F) -> Self
    where
        F: Fn(&S, &Value) -> Value + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(mapper))
    }

    pub fn map_shared(self, mapper: UniMapper<S>) -> Self {
        let key = StreamKey::Map {
            parent: self.id,
            mapper: closure_key(&mapper),
        };
        let mapper: TupleMapper<S> = Arc::new(move |s: &S, t: &[Value]| mapper(s, &t[0]));
        self.derive(
            key,
            StreamOp::Map {
                parent: self.id,
                mapper,
            },
        )
    }

    // Pairs this stream's values with `other`'s values accepted by `joiner`.
    pub fn join(
        self,
        other: UniConstraintStream<'f, S, Sc>,
        joiner: Joiner<S>,
    ) -> BiConstraintStream<'f, S, Sc> {
        let key = StreamKey::Join {
            left: self.id,
            right: other.id,
            joiner: joiner.key(),
        };
        let op = StreamOp::Join {
            left: self.id,
            right: other.id,
            joiner,
        };
        let id = self
            .factory
            .with_inner(|inner| inner.share_attached(key, op));
        BiConstraintStream::new(self.factory, id)
    }

    // Keeps the values for which `other` holds at least one value accepted
    // by `joiner`. The kept values stay in this stream: nothing of `other`
    // is added to the tuple.
    pub fn if_exists(self, other: UniConstraintStream<'f, S, Sc>, joiner: Joiner<S>) -> Self {
        self.existence(other, joiner, ExistenceMode::Exists)
    }

    // Keeps the values for which `other` holds no value accepted by `joiner`.
    pub fn if_not_exists(self, other: UniConstraintStream<'f, S, Sc>, joiner: Joiner<S>) -> Self {
        self.existence(other, joiner, ExistenceMode::NotExists)
    }

    // Groups values by `key`; each group becomes a `(key, aggregate)` pair.
    pub fn group_by<F>(self, key: F, collector: Collector<S>) -> BiConstraintStream<'f, S, Sc>
    where
        F: Fn(&S, &Value) -> Value + Send + Sync + 'static,
    {
        self.group_by_shared(Arc::new(key), collector)
    }

    pub fn group_by_shared(
        self,
        key: UniMapper<S>,
        collector: Collector<S>,
    ) -> BiConstraintStream<'f, S, Sc> {
        let stream_key = StreamKey::GroupBy {
            parent: self.id,
            key: closure_key(&key),
            collector: collector.key(),
        };
        let key: TupleMapper<S> = Arc::new(move |s: &S, t: &[Value]| key(s, &t[0]));
        let op = StreamOp::GroupBy {
            parent: self.id,
            key,
            collector,
        };
        let id = self
            .factory
            .with_inner(|inner| inner.share_attached(stream_key, op));
        BiConstraintStream::new(self.factory, id)
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
        W: Fn(&S, &Value) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Penalty,
            ConstraintWeight::Fixed(weight),
            Some(Self::erase_weigher(Arc::new(weigher))),
        )
    }

    pub fn reward_with<W>(self, weight: Sc, weigher: W) -> ConstraintBuilder<'f, S, Sc>
    where
        W: Fn(&S, &Value) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            ImpactType::Reward,
            ConstraintWeight::Fixed(weight),
            Some(Self::erase_weigher(Arc::new(weigher))),
        )
    }

    // Penalizes with a weight that configuration may override.
    pub fn penalize_configurable(self, default: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Penalty, ConstraintWeight::Configurable(default), None)
    }

    pub fn reward_configurable(self, default: Sc) -> ConstraintBuilder<'f, S, Sc> {
        self.impact(ImpactType::Reward, ConstraintWeight::Configurable(default), None)
    }

    // Penalizes with a weight read from the working solution at session build.
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

    fn erase_weigher(weigher: UniWeigher<S>) -> TupleWeigher<S> {
        Arc::new(move |s: &S, t: &[Value]| weigher(s, &t[0]))
    }

    fn existence(
        self,
        other: UniConstraintStream<'f, S, Sc>,
        joiner: Joiner<S>,
        mode: ExistenceMode,
    ) -> Self {
        let key = StreamKey::IfExists {
            left: self.id,
            right: other.id,
            joiner: joiner.key(),
            mode,
        };
        self.derive(
            key,
            StreamOp::IfExists {
                left: self.id,
                right: other.id,
                joiner,
                mode,
            },
        )
    }

    fn derive(self, key: StreamKey, op: StreamOp<S>) -> Self {
        let id = self
            .factory
            .with_inner(|inner| inner.share_attached(key, op));
        Self::new(self.factory, id)
    }
}
