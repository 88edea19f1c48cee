// Stream definitions and their content keys.
//
// A definition's key covers its operation and configuration but never its
// children: two definitions with equal keys compute the same tuples, no
// matter who consumes them.

use std::sync::Arc;

use scoreforge_core::ClassId;
use smallvec::{smallvec, SmallVec};

use super::collector::{Collector, CollectorKey};
use super::joiner::{Joiner, JoinerKey};
use super::value::Value;

/// Index of a stream definition in its factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(pub usize);

pub type UniPredicate<S> = Arc<dyn Fn(&S, &Value) -> bool + Send + Sync>;
pub type BiPredicate<S> = Arc<dyn Fn(&S, &Value, &Value) -> bool + Send + Sync>;
pub type UniMapper<S> = Arc<dyn Fn(&S, &Value) -> Value + Send + Sync>;
pub type UniWeigher<S> = Arc<dyn Fn(&S, &Value) -> i64 + Send + Sync>;
pub type BiWeigher<S> = Arc<dyn Fn(&S, &Value, &Value) -> i64 + Send + Sync>;
pub type WeightExtractor<S, Sc> = Arc<dyn Fn(&S) -> Sc + Send + Sync>;

// Arity-erased closures as the runtime nodes call them.
pub(crate) type TuplePredicate<S> = Arc<dyn Fn(&S, &[Value]) -> bool + Send + Sync>;
pub(crate) type TupleMapper<S> = Arc<dyn Fn(&S, &[Value]) -> Value + Send + Sync>;
pub(crate) type TupleWeigher<S> = Arc<dyn Fn(&S, &[Value]) -> i64 + Send + Sync>;

/// Identity of a closure: the address of its shared allocation.
///
/// The factory keeps every registered closure alive, so an address can't be
/// reused by another closure while its key is in the table.
#[inline]
pub(crate) fn closure_key<T: ?Sized>(f: &Arc<T>) -> usize {
    Arc::as_ptr(f) as *const () as usize
}

/// Whether an existence check keeps tuples with or without a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExistenceMode {
    Exists,
    NotExists,
}

impl ExistenceMode {
    #[inline]
    pub fn passes(self, matches: usize) -> bool {
        match self {
            ExistenceMode::Exists => matches > 0,
            ExistenceMode::NotExists => matches == 0,
        }
    }
}

/// Content key of a stream definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    ForEach {
        class: ClassId,
    },
    Filter {
        parent: StreamId,
        predicate: usize,
    },
    Map {
        parent: StreamId,
        mapper: usize,
    },
    Join {
        left: StreamId,
        right: StreamId,
        joiner: JoinerKey,
    },
    IfExists {
        left: StreamId,
        right: StreamId,
        joiner: JoinerKey,
        mode: ExistenceMode,
    },
    GroupBy {
        parent: StreamId,
        key: usize,
        collector: CollectorKey,
    },
    Scoring {
        parent: StreamId,
        constraint: usize,
    },
}

pub(crate) enum StreamOp<S> {
    ForEach {
        class: ClassId,
    },
    Filter {
        parent: StreamId,
        predicate: TuplePredicate<S>,
    },
    Map {
        parent: StreamId,
        mapper: TupleMapper<S>,
    },
    Join {
        left: StreamId,
        right: StreamId,
        joiner: Joiner<S>,
    },
    IfExists {
        left: StreamId,
        right: StreamId,
        joiner: Joiner<S>,
        mode: ExistenceMode,
    },
    GroupBy {
        parent: StreamId,
        key: TupleMapper<S>,
        collector: Collector<S>,
    },
    Scoring {
        parent: StreamId,
        constraint: usize,
    },
}

impl<S> StreamOp<S> {
    pub(crate) fn parents(&self) -> SmallVec<[StreamId; 2]> {
        match *self {
            StreamOp::ForEach { .. } => SmallVec::new(),
            StreamOp::Filter { parent, .. }
            | StreamOp::Map { parent, .. }
            | StreamOp::GroupBy { parent, .. }
            | StreamOp::Scoring { parent, .. } => smallvec![parent],
            StreamOp::Join { left, right, .. } | StreamOp::IfExists { left, right, .. } => {
                smallvec![left, right]
            }
        }
    }
}

pub(crate) struct StreamDef<S> {
    pub(crate) key: StreamKey,
    pub(crate) op: StreamOp<S>,
    // Attached once, after the definition became canonical.
    pub(crate) children: Vec<StreamId>,
}

impl<S> StreamDef<S> {
    pub(crate) fn new(key: StreamKey, op: StreamOp<S>) -> Self {
        Self {
            key,
            op,
            children: Vec::new(),
        }
    }
}
