//! Runtime nodes of a compiled session.
//!
//! Nodes live in one arena owned by the session and refer to their children
//! by index. Children always sit after their parents, so one pass over the
//! arena in index order propagates every pending event.
//!
//! A node reads the working solution only while it is flushed. What a node
//! needs to retract a tuple (its join key, group, or undo handle) is stored
//! when the tuple arrives, so retraction never reads the solution.

use std::collections::{HashMap, HashSet};

use scoreforge_core::score::Score;
use scoreforge_core::{ClassId, FactRef, Result, ScoreForgeError};
use smallvec::{smallvec, SmallVec};

use super::inliner::{ScoreInliner, UndoHandle};
use crate::stream::{
    Collector, ExistenceMode, Joiner, Tuple, TupleMapper, TuplePredicate, TupleWeigher, Value,
};

pub(crate) type NodeIndex = usize;

/// Session-unique identity of a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TupleId(u64);

#[derive(Debug, Default)]
pub(crate) struct TupleIds {
    next: u64,
}

impl TupleIds {
    pub(crate) fn next(&mut self) -> TupleId {
        let id = TupleId(self.next);
        self.next += 1;
        id
    }
}

/// Which input of a join an event arrives on; single-input nodes use `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ChildLink {
    pub(crate) node: NodeIndex,
    pub(crate) side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TupleEvent {
    Insert(TupleId, Tuple),
    Update(TupleId, Tuple),
    Retract(TupleId),
}

pub(crate) struct FlushContext<'a, S, Sc: Score> {
    pub(crate) solution: &'a S,
    pub(crate) inliner: &'a mut ScoreInliner<Sc>,
    pub(crate) ids: &'a mut TupleIds,
}

pub(crate) struct Node<S, Sc: Score> {
    pub(crate) kind: NodeKind<S, Sc>,
    pub(crate) children: SmallVec<[ChildLink; 2]>,
    inbox: Vec<(Side, TupleEvent)>,
}

pub(crate) enum NodeKind<S, Sc: Score> {
    ForEach(ForEachNode),
    Filter(FilterNode<S>),
    Map(MapNode<S>),
    Join(JoinNode<S>),
    IfExists(IfExistsNode<S>),
    Group(GroupNode<S>),
    Scoring(ScoringNode<S, Sc>),
}

impl<S, Sc: Score> Node<S, Sc> {
    pub(crate) fn new(kind: NodeKind<S, Sc>, children: SmallVec<[ChildLink; 2]>) -> Self {
        Self {
            kind,
            children,
            inbox: Vec::new(),
        }
    }

    pub(crate) fn for_each_class(&self) -> Option<ClassId> {
        match &self.kind {
            NodeKind::ForEach(node) => Some(node.class),
            _ => None,
        }
    }

    pub(crate) fn as_for_each_mut(&mut self) -> Option<&mut ForEachNode> {
        match &mut self.kind {
            NodeKind::ForEach(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self.kind {
            NodeKind::ForEach(_) => "for_each",
            NodeKind::Filter(_) => "filter",
            NodeKind::Map(_) => "map",
            NodeKind::Join(_) => "join",
            NodeKind::IfExists(_) => "if_exists",
            NodeKind::Group(_) => "group_by",
            NodeKind::Scoring(_) => "scoring",
        }
    }

    pub(crate) fn receive(&mut self, side: Side, event: TupleEvent) {
        self.inbox.push((side, event));
    }

    /// Processes every pending event, pushing the events for the children to `out`.
    pub(crate) fn flush(&mut self, ctx: &mut FlushContext<'_, S, Sc>, out: &mut Vec<TupleEvent>) {
        let mut inbox = std::mem::take(&mut self.inbox);
        match &mut self.kind {
            NodeKind::ForEach(node) => node.flush(out),
            NodeKind::Filter(node) => {
                for (_, event) in inbox.drain(..) {
                    node.process(ctx.solution, event, out);
                }
            }
            NodeKind::Map(node) => {
                for (_, event) in inbox.drain(..) {
                    node.process(ctx.solution, event, out);
                }
            }
            NodeKind::Join(node) => {
                for (side, event) in inbox.drain(..) {
                    node.process(ctx, side, event, out);
                }
            }
            NodeKind::IfExists(node) => {
                for (side, event) in inbox.drain(..) {
                    node.process(ctx.solution, side, event, out);
                }
            }
            NodeKind::Group(node) => {
                for (_, event) in inbox.drain(..) {
                    node.process(ctx, event);
                }
                node.emit(out);
            }
            NodeKind::Scoring(node) => {
                for (_, event) in inbox.drain(..) {
                    node.process(ctx, event);
                }
            }
        }
        self.inbox = inbox;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FactState {
    Creating,
    Updating,
    Ok,
    Dying,
}

#[derive(Debug, Clone, Copy)]
struct TrackedFact {
    id: TupleId,
    state: FactState,
}

/// Source of all facts assignable to one declared class.
///
/// Calls from the session only change a fact's state; the matching event is
/// emitted on the next flush. A fact inserted and retracted between two
/// flushes never reaches the children.
pub(crate) struct ForEachNode {
    pub(crate) class: ClassId,
    facts: HashMap<FactRef, TrackedFact>,
    dirty: Vec<FactRef>,
}

impl ForEachNode {
    pub(crate) fn new(class: ClassId) -> Self {
        Self {
            class,
            facts: HashMap::new(),
            dirty: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.facts
            .values()
            .filter(|f| f.state != FactState::Dying)
            .count()
    }

    pub(crate) fn insert(&mut self, fact: FactRef, ids: &mut TupleIds) -> Result<()> {
        match self.facts.get_mut(&fact) {
            None => {
                self.facts.insert(
                    fact,
                    TrackedFact {
                        id: ids.next(),
                        state: FactState::Creating,
                    },
                );
                self.dirty.push(fact);
                Ok(())
            }
            // Already queued by the retract.
            Some(tracked) if tracked.state == FactState::Dying => {
                tracked.state = FactState::Updating;
                Ok(())
            }
            Some(_) => Err(ScoreForgeError::InvalidState(format!(
                "The fact ({}) was already inserted",
                fact
            ))),
        }
    }

    pub(crate) fn update(&mut self, fact: FactRef) -> Result<()> {
        let Some(tracked) = self.facts.get_mut(&fact) else {
            return Err(not_inserted(fact));
        };
        match tracked.state {
            FactState::Creating | FactState::Updating => Ok(()),
            FactState::Ok => {
                tracked.state = FactState::Updating;
                self.dirty.push(fact);
                Ok(())
            }
            FactState::Dying => Err(not_inserted(fact)),
        }
    }

    pub(crate) fn retract(&mut self, fact: FactRef) -> Result<()> {
        let Some(tracked) = self.facts.get_mut(&fact) else {
            return Err(not_inserted(fact));
        };
        match tracked.state {
            FactState::Creating => {
                self.facts.remove(&fact);
                Ok(())
            }
            FactState::Updating => {
                tracked.state = FactState::Dying;
                Ok(())
            }
            FactState::Ok => {
                tracked.state = FactState::Dying;
                self.dirty.push(fact);
                Ok(())
            }
            FactState::Dying => Err(not_inserted(fact)),
        }
    }

    fn flush(&mut self, out: &mut Vec<TupleEvent>) {
        for fact in self.dirty.drain(..) {
            let Some(tracked) = self.facts.get_mut(&fact) else {
                continue;
            };
            match tracked.state {
                FactState::Creating => {
                    tracked.state = FactState::Ok;
                    out.push(TupleEvent::Insert(tracked.id, smallvec![Value::Fact(fact)]));
                }
                FactState::Updating => {
                    tracked.state = FactState::Ok;
                    out.push(TupleEvent::Update(tracked.id, smallvec![Value::Fact(fact)]));
                }
                FactState::Dying => {
                    out.push(TupleEvent::Retract(tracked.id));
                    self.facts.remove(&fact);
                }
                FactState::Ok => {}
            }
        }
    }
}

fn not_inserted(fact: FactRef) -> ScoreForgeError {
    ScoreForgeError::InvalidState(format!("The fact ({}) was never inserted", fact))
}

pub(crate) struct FilterNode<S> {
    predicate: TuplePredicate<S>,
    passed: HashSet<TupleId>,
}

impl<S> FilterNode<S> {
    pub(crate) fn new(predicate: TuplePredicate<S>) -> Self {
        Self {
            predicate,
            passed: HashSet::new(),
        }
    }

    fn process(&mut self, solution: &S, event: TupleEvent, out: &mut Vec<TupleEvent>) {
        match event {
            TupleEvent::Insert(id, tuple) => {
                if (self.predicate)(solution, &tuple) {
                    self.passed.insert(id);
                    out.push(TupleEvent::Insert(id, tuple));
                }
            }
            TupleEvent::Update(id, tuple) => {
                let passes = (self.predicate)(solution, &tuple);
                match (self.passed.contains(&id), passes) {
                    (true, true) => out.push(TupleEvent::Update(id, tuple)),
                    (true, false) => {
                        self.passed.remove(&id);
                        out.push(TupleEvent::Retract(id));
                    }
                    (false, true) => {
                        self.passed.insert(id);
                        out.push(TupleEvent::Insert(id, tuple));
                    }
                    (false, false) => {}
                }
            }
            TupleEvent::Retract(id) => {
                if self.passed.remove(&id) {
                    out.push(TupleEvent::Retract(id));
                }
            }
        }
    }
}

/// Stateless: a mapped tuple keeps the identity of its input.
pub(crate) struct MapNode<S> {
    mapper: TupleMapper<S>,
}

impl<S> MapNode<S> {
    pub(crate) fn new(mapper: TupleMapper<S>) -> Self {
        Self { mapper }
    }

    fn process(&mut self, solution: &S, event: TupleEvent, out: &mut Vec<TupleEvent>) {
        match event {
            TupleEvent::Insert(id, tuple) => {
                out.push(TupleEvent::Insert(id, smallvec![(self.mapper)(solution, &tuple)]))
            }
            TupleEvent::Update(id, tuple) => {
                out.push(TupleEvent::Update(id, smallvec![(self.mapper)(solution, &tuple)]))
            }
            TupleEvent::Retract(id) => out.push(TupleEvent::Retract(id)),
        }
    }
}

#[derive(Default)]
struct JoinMemory {
    tuples: HashMap<TupleId, (Tuple, Value)>,
    index: HashMap<Value, Vec<TupleId>>,
}

impl JoinMemory {
    fn add(&mut self, id: TupleId, tuple: Tuple, key: Value) {
        self.index.entry(key.clone()).or_default().push(id);
        self.tuples.insert(id, (tuple, key));
    }

    fn remove(&mut self, id: TupleId) -> Option<(Tuple, Value)> {
        let (tuple, key) = self.tuples.remove(&id)?;
        if let Some(bucket) = self.index.get_mut(&key) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                self.index.remove(&key);
            }
        }
        Some((tuple, key))
    }

    fn matching(&self, key: &Value) -> &[TupleId] {
        self.index.get(key).map_or(&[], Vec::as_slice)
    }
}

/// Pairs left and right tuples whose joiner keys are equal.
pub(crate) struct JoinNode<S> {
    joiner: Joiner<S>,
    left: JoinMemory,
    right: JoinMemory,
    // (left, right) -> output tuple
    pairs: HashMap<(TupleId, TupleId), TupleId>,
}

impl<S> JoinNode<S> {
    pub(crate) fn new(joiner: Joiner<S>) -> Self {
        Self {
            joiner,
            left: JoinMemory::default(),
            right: JoinMemory::default(),
            pairs: HashMap::new(),
        }
    }

    fn process<Sc: Score>(
        &mut self,
        ctx: &mut FlushContext<'_, S, Sc>,
        side: Side,
        event: TupleEvent,
        out: &mut Vec<TupleEvent>,
    ) {
        match event {
            TupleEvent::Insert(id, tuple) => {
                let key = self.key_of(ctx.solution, side, &tuple);
                self.insert(ctx.ids, side, id, tuple, key, out);
            }
            TupleEvent::Update(id, tuple) => {
                let key = self.key_of(ctx.solution, side, &tuple);
                let (own, _, _) = self.memories(side);
                match own.tuples.get_mut(&id) {
                    Some((stored, old_key)) if *old_key == key => {
                        *stored = tuple;
                        self.update_pairs(side, id, out);
                    }
                    _ => {
                        self.retract(side, id, out);
                        self.insert(ctx.ids, side, id, tuple, key, out);
                    }
                }
            }
            TupleEvent::Retract(id) => self.retract(side, id, out),
        }
    }

    fn key_of(&self, solution: &S, side: Side, tuple: &Tuple) -> Value {
        match side {
            Side::Left => self.joiner.left_key(solution, &tuple[0]),
            Side::Right => self.joiner.right_key(solution, &tuple[0]),
        }
    }

    fn memories(
        &mut self,
        side: Side,
    ) -> (
        &mut JoinMemory,
        &JoinMemory,
        &mut HashMap<(TupleId, TupleId), TupleId>,
    ) {
        match side {
            Side::Left => (&mut self.left, &self.right, &mut self.pairs),
            Side::Right => (&mut self.right, &self.left, &mut self.pairs),
        }
    }

    fn insert(
        &mut self,
        ids: &mut TupleIds,
        side: Side,
        id: TupleId,
        tuple: Tuple,
        key: Value,
        out: &mut Vec<TupleEvent>,
    ) {
        let (own, other, pairs) = self.memories(side);
        for &other_id in other.matching(&key) {
            if let Some((other_tuple, _)) = other.tuples.get(&other_id) {
                let pair_id = ids.next();
                pairs.insert(pair_key(side, id, other_id), pair_id);
                out.push(TupleEvent::Insert(pair_id, joined(side, &tuple, other_tuple)));
            }
        }
        own.add(id, tuple, key);
    }

    fn update_pairs(&mut self, side: Side, id: TupleId, out: &mut Vec<TupleEvent>) {
        let (own, other, pairs) = self.memories(side);
        let Some((tuple, key)) = own.tuples.get(&id) else {
            return;
        };
        for &other_id in other.matching(key) {
            if let (Some(&pair_id), Some((other_tuple, _))) = (
                pairs.get(&pair_key(side, id, other_id)),
                other.tuples.get(&other_id),
            ) {
                out.push(TupleEvent::Update(pair_id, joined(side, tuple, other_tuple)));
            }
        }
    }

    fn retract(&mut self, side: Side, id: TupleId, out: &mut Vec<TupleEvent>) {
        let (own, other, pairs) = self.memories(side);
        let Some((_, key)) = own.remove(id) else {
            return;
        };
        for &other_id in other.matching(&key) {
            if let Some(pair_id) = pairs.remove(&pair_key(side, id, other_id)) {
                out.push(TupleEvent::Retract(pair_id));
            }
        }
    }
}

fn pair_key(side: Side, own: TupleId, other: TupleId) -> (TupleId, TupleId) {
    match side {
        Side::Left => (own, other),
        Side::Right => (other, own),
    }
}

fn joined(side: Side, own: &Tuple, other: &Tuple) -> Tuple {
    let (left, right) = match side {
        Side::Left => (own, other),
        Side::Right => (other, own),
    };
    left.iter().chain(right.iter()).cloned().collect()
}

/// Passes left tuples on while the right side holds (or lacks) a tuple with
/// an equal joiner key.
///
/// Right tuples are only counted per key. Left tuples of a key are checked
/// again when that count moves between zero and one; a passing left tuple
/// keeps its identity downstream.
pub(crate) struct IfExistsNode<S> {
    joiner: Joiner<S>,
    mode: ExistenceMode,
    left: JoinMemory,
    propagated: HashSet<TupleId>,
    right: HashMap<TupleId, Value>,
    counts: HashMap<Value, usize>,
}

impl<S> IfExistsNode<S> {
    pub(crate) fn new(joiner: Joiner<S>, mode: ExistenceMode) -> Self {
        Self {
            joiner,
            mode,
            left: JoinMemory::default(),
            propagated: HashSet::new(),
            right: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    fn process(&mut self, solution: &S, side: Side, event: TupleEvent, out: &mut Vec<TupleEvent>) {
        match (side, event) {
            (Side::Left, TupleEvent::Insert(id, tuple) | TupleEvent::Update(id, tuple)) => {
                let key = self.joiner.left_key(solution, &tuple[0]);
                self.upsert_left(id, tuple, key, out);
            }
            (Side::Left, TupleEvent::Retract(id)) => {
                if self.left.remove(id).is_some() && self.propagated.remove(&id) {
                    out.push(TupleEvent::Retract(id));
                }
            }
            (Side::Right, TupleEvent::Insert(id, tuple) | TupleEvent::Update(id, tuple)) => {
                let key = self.joiner.right_key(solution, &tuple[0]);
                if self.right.get(&id) == Some(&key) {
                    return;
                }
                self.retract_right(id, out);
                self.insert_right(id, key, out);
            }
            (Side::Right, TupleEvent::Retract(id)) => self.retract_right(id, out),
        }
    }

    fn passes(&self, key: &Value) -> bool {
        self.mode.passes(self.counts.get(key).copied().unwrap_or(0))
    }

    fn upsert_left(&mut self, id: TupleId, tuple: Tuple, key: Value, out: &mut Vec<TupleEvent>) {
        self.left.remove(id);
        let passes = self.passes(&key);
        match (self.propagated.contains(&id), passes) {
            (true, true) => out.push(TupleEvent::Update(id, tuple.clone())),
            (true, false) => {
                self.propagated.remove(&id);
                out.push(TupleEvent::Retract(id));
            }
            (false, true) => {
                self.propagated.insert(id);
                out.push(TupleEvent::Insert(id, tuple.clone()));
            }
            (false, false) => {}
        }
        self.left.add(id, tuple, key);
    }

    fn insert_right(&mut self, id: TupleId, key: Value, out: &mut Vec<TupleEvent>) {
        let count = self.counts.entry(key.clone()).or_insert(0);
        *count += 1;
        let first = *count == 1;
        self.right.insert(id, key.clone());
        if first {
            self.recheck(&key, out);
        }
    }

    fn retract_right(&mut self, id: TupleId, out: &mut Vec<TupleEvent>) {
        let Some(key) = self.right.remove(&id) else {
            return;
        };
        let Some(count) = self.counts.get_mut(&key) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
            self.recheck(&key, out);
        }
    }

    fn recheck(&mut self, key: &Value, out: &mut Vec<TupleEvent>) {
        let passes = self.passes(key);
        for &id in self.left.matching(key) {
            let Some((tuple, _)) = self.left.tuples.get(&id) else {
                continue;
            };
            if passes && self.propagated.insert(id) {
                out.push(TupleEvent::Insert(id, tuple.clone()));
            } else if !passes && self.propagated.remove(&id) {
                out.push(TupleEvent::Retract(id));
            }
        }
    }
}

struct Group {
    id: TupleId,
    size: usize,
    total: i64,
    emitted: Option<i64>,
    dirty: bool,
}

/// Aggregates tuples per key; each non-empty group is one `(key, aggregate)` tuple.
///
/// Groups are emitted lazily: after its inbox is drained the node sends at
/// most one event per changed group.
pub(crate) struct GroupNode<S> {
    key: TupleMapper<S>,
    collector: Collector<S>,
    members: HashMap<TupleId, (Value, i64)>,
    groups: HashMap<Value, Group>,
    dirty: Vec<Value>,
}

impl<S> GroupNode<S> {
    pub(crate) fn new(key: TupleMapper<S>, collector: Collector<S>) -> Self {
        Self {
            key,
            collector,
            members: HashMap::new(),
            groups: HashMap::new(),
            dirty: Vec::new(),
        }
    }

    fn process<Sc: Score>(&mut self, ctx: &mut FlushContext<'_, S, Sc>, event: TupleEvent) {
        match event {
            TupleEvent::Insert(id, tuple) | TupleEvent::Update(id, tuple) => {
                if let Some((key, contribution)) = self.members.remove(&id) {
                    self.leave(key, contribution);
                }
                let key = (self.key)(ctx.solution, &tuple);
                let contribution = self.collector.contribution(ctx.solution, &tuple[0]);
                self.enter(ctx.ids, key.clone(), contribution);
                self.members.insert(id, (key, contribution));
            }
            TupleEvent::Retract(id) => {
                if let Some((key, contribution)) = self.members.remove(&id) {
                    self.leave(key, contribution);
                }
            }
        }
    }

    fn enter(&mut self, ids: &mut TupleIds, key: Value, contribution: i64) {
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            id: ids.next(),
            size: 0,
            total: 0,
            emitted: None,
            dirty: false,
        });
        group.size += 1;
        group.total += contribution;
        if !group.dirty {
            group.dirty = true;
            self.dirty.push(key);
        }
    }

    fn leave(&mut self, key: Value, contribution: i64) {
        if let Some(group) = self.groups.get_mut(&key) {
            group.size -= 1;
            group.total -= contribution;
            if !group.dirty {
                group.dirty = true;
                self.dirty.push(key);
            }
        }
    }

    fn emit(&mut self, out: &mut Vec<TupleEvent>) {
        for key in self.dirty.drain(..) {
            let Some(group) = self.groups.get_mut(&key) else {
                continue;
            };
            group.dirty = false;
            if group.size == 0 {
                if group.emitted.is_some() {
                    out.push(TupleEvent::Retract(group.id));
                }
                self.groups.remove(&key);
                continue;
            }
            match group.emitted {
                None => out.push(TupleEvent::Insert(
                    group.id,
                    smallvec![key, Value::Int(group.total)],
                )),
                Some(previous) if previous != group.total => out.push(TupleEvent::Update(
                    group.id,
                    smallvec![key, Value::Int(group.total)],
                )),
                Some(_) => {}
            }
            group.emitted = Some(group.total);
        }
    }
}

/// Terminal node of one constraint: turns tuples into matches.
pub(crate) struct ScoringNode<S, Sc: Score> {
    pub(crate) constraint: usize,
    weigher: Option<TupleWeigher<S>>,
    matches: HashMap<TupleId, UndoHandle<Sc>>,
}

impl<S, Sc: Score> ScoringNode<S, Sc> {
    pub(crate) fn new(constraint: usize, weigher: Option<TupleWeigher<S>>) -> Self {
        Self {
            constraint,
            weigher,
            matches: HashMap::new(),
        }
    }

    fn process(&mut self, ctx: &mut FlushContext<'_, S, Sc>, event: TupleEvent) {
        match event {
            TupleEvent::Insert(id, tuple) | TupleEvent::Update(id, tuple) => {
                if let Some(handle) = self.matches.remove(&id) {
                    ctx.inliner.undo(handle);
                }
                let match_weight = self
                    .weigher
                    .as_ref()
                    .map_or(1, |weigher| weigher(ctx.solution, &tuple));
                let handle = ctx.inliner.impact(self.constraint, match_weight, &tuple);
                self.matches.insert(id, handle);
            }
            TupleEvent::Retract(id) => {
                if let Some(handle) = self.matches.remove(&id) {
                    ctx.inliner.undo(handle);
                }
            }
        }
    }
}
