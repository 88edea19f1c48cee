// Constraint factory and node sharing.
//
// The factory is the entry point for the fluent constraint API. It owns
// every stream definition and hands out `Copy` handles to them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use scoreforge_core::score::Score;
use scoreforge_core::ClassId;

use super::constraint::ConstraintDef;
use super::definition::{StreamDef, StreamId, StreamKey, StreamOp};
use super::uni_stream::UniConstraintStream;

// Factory for creating constraint streams.
//
// Streams are deduplicated by content: declaring `for_each(EMPLOYEE)` in
// ten constraints yields one stream, and so one compiled node.
//
// # Example
//
// ```
// use scoreforge_core::{ClassId, SimpleScore};
// use scoreforge_scoring::stream::ConstraintFactory;
//
// let factory = ConstraintFactory::<(), SimpleScore>::new();
// let a = factory.for_each(ClassId(0));
// let b = factory.for_each(ClassId(0));
// assert_eq!(a.id(), b.id());
//
// a.penalize(SimpleScore::of(1)).as_constraint("First");
// b.penalize(SimpleScore::of(2)).as_constraint("Second");
// // One source stream plus one scoring stream per constraint
// assert_eq!(factory.stream_count(), 3);
// ```
pub struct ConstraintFactory<S, Sc: Score> {
    inner: RefCell<FactoryInner<S, Sc>>,
}

pub(crate) struct FactoryInner<S, Sc: Score> {
    pub(crate) streams: Vec<StreamDef<S>>,
    index: HashMap<StreamKey, StreamId>,
    pub(crate) constraints: Vec<ConstraintDef<S, Sc>>,
}

impl<S, Sc: Score> FactoryInner<S, Sc> {
    fn new() -> Self {
        Self {
            streams: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
        }
    }

    // Returns the canonical stream for `definition`.
    //
    // On the first occurrence of a key the definition is registered and
    // `initializer` runs with its new id; later occurrences return the
    // registered id and drop `definition` without running `initializer`.
    // Children must only be attached from the initializer.
    pub(crate) fn share(
        &mut self,
        definition: StreamDef<S>,
        initializer: impl FnOnce(&mut Self, StreamId),
    ) -> StreamId {
        if let Some(&id) = self.index.get(&definition.key) {
            return id;
        }
        let id = StreamId(self.streams.len());
        self.index.insert(definition.key.clone(), id);
        self.streams.push(definition);
        initializer(self, id);
        id
    }

    // Shares a definition and attaches it as a child of its parents.
    pub(crate) fn share_attached(&mut self, key: StreamKey, op: StreamOp<S>) -> StreamId {
        let parents = op.parents();
        self.share(StreamDef::new(key, op), |inner, id| {
            for parent in parents {
                inner.streams[parent.0].children.push(id);
            }
        })
    }
}

impl<S, Sc> ConstraintFactory<S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    // Creates a new constraint factory.
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(FactoryInner::new()),
        }
    }

    // Starts a stream over every fact of `class`, including facts of its subclasses.
    pub fn for_each(&self, class: ClassId) -> UniConstraintStream<'_, S, Sc> {
        let key = StreamKey::ForEach { class };
        let id = self.with_inner(|inner| inner.share_attached(key, StreamOp::ForEach { class }));
        UniConstraintStream::new(self, id)
    }

    // Number of distinct stream definitions declared so far.
    pub fn stream_count(&self) -> usize {
        self.inner.borrow().streams.len()
    }

    // Number of constraints declared so far.
    pub fn constraint_count(&self) -> usize {
        self.inner.borrow().constraints.len()
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut FactoryInner<S, Sc>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub(crate) fn into_parts(self) -> (Vec<StreamDef<S>>, Vec<ConstraintDef<S, Sc>>) {
        let inner = self.inner.into_inner();
        (inner.streams, inner.constraints)
    }
}

impl<S, Sc> Default for ConstraintFactory<S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, Sc: Score> fmt::Debug for ConstraintFactory<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ConstraintFactory")
            .field("streams", &inner.streams.len())
            .field("constraints", &inner.constraints.len())
            .finish()
    }
}
