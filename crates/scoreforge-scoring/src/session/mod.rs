//! Compiled scoring sessions.
//!
//! A [`ConstraintSessionFactory`] compiles the declared constraints into a
//! [`ConstraintSession`]: an arena of runtime nodes fed by one source node
//! per declared class. Facts enter through [`insert`](ConstraintSession::insert),
//! [`update`](ConstraintSession::update) and [`retract`](ConstraintSession::retract);
//! the score materializes in [`calculate_score`](ConstraintSession::calculate_score).

mod build;
mod inliner;
mod node;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use scoreforge_core::score::{InitScore, Score};
use scoreforge_core::{ClassId, FactRef, Result};
use smallvec::SmallVec;

use crate::api::{ConstraintMatchTotal, IndictmentMap, ScoreExplanation};
use node::{FlushContext, Node, NodeIndex, TupleEvent, TupleIds};

pub use build::{ConstraintSessionFactory, SolutionWeights};
pub use inliner::{ScoreInliner, UndoHandle};

/// The runtime network of one working solution.
///
/// Changes are recorded by the source nodes and only propagated when the
/// score is calculated. A session never keeps a reference to the solution:
/// the solution is passed to [`calculate_score`](Self::calculate_score),
/// and retracting a fact does not read it.
pub struct ConstraintSession<S, Sc: Score> {
    nodes: Vec<Node<S, Sc>>,
    // declared class -> source node
    sources: HashMap<ClassId, NodeIndex>,
    // concrete class -> the class and its ancestors
    ancestry: Vec<Vec<ClassId>>,
    // concrete class -> every source node accepting it, resolved on first use
    dispatch: HashMap<ClassId, SmallVec<[NodeIndex; 2]>>,
    inliner: ScoreInliner<Sc>,
    ids: TupleIds,
    events: Vec<TupleEvent>,
}

impl<S, Sc: Score> ConstraintSession<S, Sc> {
    pub(crate) fn new(
        nodes: Vec<Node<S, Sc>>,
        sources: HashMap<ClassId, NodeIndex>,
        ancestry: Vec<Vec<ClassId>>,
        inliner: ScoreInliner<Sc>,
    ) -> Self {
        Self {
            nodes,
            sources,
            ancestry,
            dispatch: HashMap::new(),
            inliner,
            ids: TupleIds::default(),
            events: Vec::new(),
        }
    }

    /// Adds a fact to every source accepting its class.
    ///
    /// A fact no source accepts is ignored.
    pub fn insert(&mut self, fact: FactRef) -> Result<()> {
        for index in self.effective_sources(fact.class) {
            if let Some(source) = self.nodes[index].as_for_each_mut() {
                source.insert(fact, &mut self.ids)?;
            }
        }
        Ok(())
    }

    /// Marks an inserted fact as changed.
    pub fn update(&mut self, fact: FactRef) -> Result<()> {
        for index in self.effective_sources(fact.class) {
            if let Some(source) = self.nodes[index].as_for_each_mut() {
                source.update(fact)?;
            }
        }
        Ok(())
    }

    pub fn retract(&mut self, fact: FactRef) -> Result<()> {
        for index in self.effective_sources(fact.class) {
            if let Some(source) = self.nodes[index].as_for_each_mut() {
                source.retract(fact)?;
            }
        }
        Ok(())
    }

    /// Propagates every pending change and returns the score.
    pub fn calculate_score(&mut self, solution: &S, init_score: i32) -> InitScore<Sc> {
        self.flush(solution);
        self.inliner.extract_score(init_score)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of declared classes with a source node.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn has_source(&self, class: ClassId) -> bool {
        self.sources.contains_key(&class)
    }

    /// Facts currently held by the source node of a declared class.
    pub fn source_fact_count(&self, class: ClassId) -> usize {
        self.sources
            .get(&class)
            .and_then(|&index| match &self.nodes[index].kind {
                node::NodeKind::ForEach(source) => Some(source.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn is_tracking(&self) -> bool {
        self.inliner.is_tracking()
    }

    /// Match totals keyed by constraint full name; empty unless tracking.
    ///
    /// Reflects the last calculated score.
    pub fn constraint_match_total_map(&self) -> &BTreeMap<String, ConstraintMatchTotal<Sc>> {
        self.inliner.constraint_match_totals()
    }

    /// Indictments keyed by justifying value; empty unless tracking.
    pub fn indictment_map(&self) -> &IndictmentMap<Sc> {
        self.inliner.indictments()
    }

    pub fn explain(&self, init_score: i32) -> ScoreExplanation<Sc> {
        self.inliner.explain(init_score)
    }

    fn effective_sources(&mut self, class: ClassId) -> SmallVec<[NodeIndex; 2]> {
        if let Some(resolved) = self.dispatch.get(&class) {
            return resolved.clone();
        }
        let resolved: SmallVec<[NodeIndex; 2]> = self
            .ancestry
            .get(class.0)
            .map(|chain| {
                chain
                    .iter()
                    .filter_map(|declared| self.sources.get(declared).copied())
                    .collect()
            })
            .unwrap_or_default();
        self.dispatch.insert(class, resolved.clone());
        resolved
    }

    // Flushes every node in arena order. Children always sit after their
    // parent, so one pass reaches a fixed point.
    fn flush(&mut self, solution: &S) {
        let mut events = std::mem::take(&mut self.events);
        let mut ctx = FlushContext {
            solution,
            inliner: &mut self.inliner,
            ids: &mut self.ids,
        };
        for i in 0..self.nodes.len() {
            let (head, tail) = self.nodes.split_at_mut(i + 1);
            let node = &mut head[i];
            node.flush(&mut ctx, &mut events);
            if events.is_empty() {
                continue;
            }
            for link in &node.children {
                debug_assert!(link.node > i, "child {} precedes its parent {}", link.node, i);
                let child = &mut tail[link.node - i - 1];
                for event in &events {
                    child.receive(link.side, event.clone());
                }
            }
            events.clear();
        }
        self.events = events;
    }
}

impl<S, Sc: Score> fmt::Debug for ConstraintSession<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.nodes.iter().map(Node::label).collect();
        f.debug_struct("ConstraintSession")
            .field("nodes", &labels)
            .field("sources", &self.sources.len())
            .field("tracking", &self.inliner.is_tracking())
            .finish()
    }
}
