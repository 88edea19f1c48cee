//! Session factory and graph compiler.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use scoreforge_core::score::Score;
use scoreforge_core::{ClassId, ConstraintRef, Result, ScoreForgeError, SolutionDescriptor};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::inliner::ScoreInliner;
use super::node::{
    ChildLink, FilterNode, ForEachNode, GroupNode, IfExistsNode, JoinNode, MapNode, Node,
    NodeIndex, NodeKind, ScoringNode, Side,
};
use super::ConstraintSession;
use crate::api::WeightProvider;
use crate::stream::{ConstraintDef, ConstraintFactory, ConstraintWeight, StreamDef, StreamId, StreamOp};

/// Reads the weight provider a solution carries.
pub type SolutionWeights<S, Sc> = fn(&S) -> &dyn WeightProvider<Sc>;

/// Compiles declared constraints into sessions.
///
/// The factory is immutable once created and can be shared between
/// score directors. Constraint weights are resolved against the working
/// solution every time a session is built; constraints whose weight
/// resolves to zero are not compiled at all.
///
/// Weight resolution, first match wins:
/// 1. the overrides passed to the build (from configuration)
/// 2. the overrides registered with [`with_overrides`](Self::with_overrides)
/// 3. for configurable constraints, the provider read from the solution
///    with [`with_solution_weights`](Self::with_solution_weights)
/// 4. the declared weight, or the extractor's result
///
/// # Example
///
/// ```
/// use scoreforge_core::{ClassId, SimpleScore};
/// use scoreforge_scoring::session::ConstraintSessionFactory;
///
/// let sessions = ConstraintSessionFactory::<(), SimpleScore>::from_provider(|factory| {
///     factory.for_each(ClassId(0)).penalize(SimpleScore::ONE).as_constraint("Each");
///     factory.for_each(ClassId(0)).penalize(SimpleScore::ZERO).as_constraint("Muted");
/// })
/// .unwrap();
///
/// assert_eq!(sessions.constraint_refs().count(), 2);
/// assert_eq!(sessions.resolve_weights(&()), vec![SimpleScore::ONE, SimpleScore::ZERO]);
/// ```
pub struct ConstraintSessionFactory<S, Sc: Score> {
    streams: Vec<StreamDef<S>>,
    constraints: Vec<ConstraintDef<S, Sc>>,
    overrides: Option<Arc<dyn WeightProvider<Sc>>>,
    solution_weights: Option<SolutionWeights<S, Sc>>,
}

impl<S, Sc> ConstraintSessionFactory<S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    /// Takes ownership of the streams and constraints declared on `factory`.
    ///
    /// Fails if two constraints share a full name.
    pub fn new(factory: ConstraintFactory<S, Sc>) -> Result<Self> {
        let (streams, constraints) = factory.into_parts();
        let mut names = HashSet::new();
        for constraint in &constraints {
            if !names.insert(constraint.constraint_ref.full_name()) {
                return Err(ScoreForgeError::Config(format!(
                    "the constraint ({}) is declared more than once",
                    constraint.constraint_ref
                )));
            }
        }
        Ok(Self {
            streams,
            constraints,
            overrides: None,
            solution_weights: None,
        })
    }

    /// Declares constraints on a fresh factory with `provider`.
    pub fn from_provider<F>(provider: F) -> Result<Self>
    where
        F: FnOnce(&ConstraintFactory<S, Sc>),
    {
        let factory = ConstraintFactory::new();
        provider(&factory);
        Self::new(factory)
    }

    pub fn with_overrides(mut self, overrides: impl WeightProvider<Sc> + 'static) -> Self {
        self.overrides = Some(Arc::new(overrides));
        self
    }

    pub fn with_solution_weights(mut self, weights: SolutionWeights<S, Sc>) -> Self {
        self.solution_weights = Some(weights);
        self
    }

    /// Constraints in declaration order.
    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> + '_ {
        self.constraints.iter().map(|c| &c.constraint_ref)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of distinct stream definitions, before pruning.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Weights of every constraint, in declaration order.
    pub fn resolve_weights(&self, solution: &S) -> Vec<Sc> {
        self.weights(solution, None)
    }

    /// Compiles a session for `solution`; no fact is inserted yet.
    pub fn build_session(
        &self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        tracking: bool,
    ) -> Result<ConstraintSession<S, Sc>> {
        self.build_session_with(descriptor, solution, tracking, None)
    }

    pub(crate) fn build_session_with(
        &self,
        descriptor: &SolutionDescriptor<S>,
        solution: &S,
        tracking: bool,
        config_weights: Option<&dyn WeightProvider<Sc>>,
    ) -> Result<ConstraintSession<S, Sc>> {
        let weights = self.weights(solution, config_weights);

        let mut active = Vec::with_capacity(self.constraints.len());
        for (constraint, weight) in self.constraints.iter().zip(&weights) {
            if weight.is_zero() {
                trace!(
                    event = "constraint_pruned",
                    constraint = %constraint.constraint_ref,
                );
            } else {
                active.push(constraint.stream);
            }
        }
        let pruned = self.constraints.len() - active.len();

        let order = self.active_streams(&active);
        let nodes = self.compile(&order);
        let sources = register_sources(&nodes, descriptor)?;

        let inliner = ScoreInliner::new(
            self.constraints
                .iter()
                .zip(weights)
                .map(|(c, weight)| (c.constraint_ref.clone(), c.impact, weight))
                .collect(),
            tracking,
        );

        debug!(
            event = "session_built",
            nodes = nodes.len(),
            source_classes = sources.len(),
            constraints = active.len(),
            pruned,
        );

        let ancestry = descriptor
            .classes()
            .iter()
            .map(|class| descriptor.ancestors(class.id))
            .collect();
        Ok(ConstraintSession::new(nodes, sources, ancestry, inliner))
    }

    fn weights(&self, solution: &S, config_weights: Option<&dyn WeightProvider<Sc>>) -> Vec<Sc> {
        self.constraints
            .iter()
            .map(|constraint| {
                let overridden = config_weights
                    .and_then(|p| p.weight_of(&constraint.constraint_ref))
                    .or_else(|| {
                        self.overrides
                            .as_ref()
                            .and_then(|p| p.weight_of(&constraint.constraint_ref))
                    });
                if let Some(weight) = overridden {
                    return weight;
                }
                match &constraint.weight {
                    ConstraintWeight::Fixed(weight) => *weight,
                    ConstraintWeight::Configurable(default) => self
                        .solution_weights
                        .and_then(|get| get(solution).weight_of(&constraint.constraint_ref))
                        .unwrap_or(*default),
                    ConstraintWeight::Extracted(extract) => extract(solution),
                }
            })
            .collect()
    }

    // Streams reachable from the given scoring streams, every parent before
    // its children. The order only depends on declaration order.
    fn active_streams(&self, roots: &[StreamId]) -> Vec<StreamId> {
        fn visit<S>(
            streams: &[StreamDef<S>],
            id: StreamId,
            seen: &mut [bool],
            order: &mut Vec<StreamId>,
        ) {
            if seen[id.0] {
                return;
            }
            seen[id.0] = true;
            for parent in streams[id.0].op.parents() {
                visit(streams, parent, seen, order);
            }
            order.push(id);
        }

        let mut seen = vec![false; self.streams.len()];
        let mut order = Vec::new();
        for &root in roots {
            visit(&self.streams, root, &mut seen, &mut order);
        }
        order
    }

    // Builds one node per stream, consumers first. A node is built after
    // every child it links to; the finished arena is then reversed so that
    // flushing in index order visits producers before consumers.
    fn compile(&self, order: &[StreamId]) -> Vec<Node<S, Sc>> {
        let count = order.len();
        let position: HashMap<StreamId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        // Index in `built` of the stream at `order[i]`.
        let built_index = |i: usize| count - 1 - i;

        let mut built: Vec<Node<S, Sc>> = Vec::with_capacity(count);
        for &id in order.iter().rev() {
            let definition = &self.streams[id.0];
            let mut children: SmallVec<[ChildLink; 2]> = SmallVec::new();
            let mut linked = HashSet::new();
            for &child in &definition.children {
                // A self join lists its child twice.
                if !linked.insert(child) {
                    continue;
                }
                let Some(&child_position) = position.get(&child) else {
                    continue;
                };
                for side in input_sides(&self.streams[child.0].op, id) {
                    children.push(ChildLink {
                        node: built_index(child_position),
                        side,
                    });
                }
            }
            built.push(Node::new(self.instantiate(&definition.op), children));
        }

        built.reverse();
        for node in &mut built {
            for link in &mut node.children {
                link.node = count - 1 - link.node;
            }
        }
        built
    }

    fn instantiate(&self, op: &StreamOp<S>) -> NodeKind<S, Sc> {
        match op {
            StreamOp::ForEach { class } => NodeKind::ForEach(ForEachNode::new(*class)),
            StreamOp::Filter { predicate, .. } => {
                NodeKind::Filter(FilterNode::new(Arc::clone(predicate)))
            }
            StreamOp::Map { mapper, .. } => NodeKind::Map(MapNode::new(Arc::clone(mapper))),
            StreamOp::Join { joiner, .. } => NodeKind::Join(JoinNode::new(joiner.clone())),
            StreamOp::IfExists { joiner, mode, .. } => {
                NodeKind::IfExists(IfExistsNode::new(joiner.clone(), *mode))
            }
            StreamOp::GroupBy { key, collector, .. } => {
                NodeKind::Group(GroupNode::new(Arc::clone(key), collector.clone()))
            }
            StreamOp::Scoring { constraint, .. } => NodeKind::Scoring(ScoringNode::new(
                *constraint,
                self.constraints[*constraint].weigher.clone(),
            )),
        }
    }
}

// The inputs of `child` fed by `parent`: both sides for a self join.
fn input_sides<S>(child: &StreamOp<S>, parent: StreamId) -> SmallVec<[Side; 2]> {
    match *child {
        StreamOp::Join { left, right, .. } | StreamOp::IfExists { left, right, .. } => {
            let mut sides = SmallVec::new();
            if left == parent {
                sides.push(Side::Left);
            }
            if right == parent {
                sides.push(Side::Right);
            }
            sides
        }
        _ => SmallVec::from_elem(Side::Left, 1),
    }
}

/// Maps each declared class to its for-each node.
pub(crate) fn register_sources<S, Sc: Score>(
    nodes: &[Node<S, Sc>],
    descriptor: &SolutionDescriptor<S>,
) -> Result<HashMap<ClassId, NodeIndex>> {
    let mut sources = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        let Some(class) = node.for_each_class() else {
            continue;
        };
        if sources.insert(class, index).is_some() {
            return Err(ScoreForgeError::DuplicateSourceNode {
                class: descriptor.class_name(class).to_string(),
            });
        }
    }
    Ok(sources)
}

impl<S, Sc: Score> fmt::Debug for ConstraintSessionFactory<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSessionFactory")
            .field("streams", &self.streams.len())
            .field("constraints", &self.constraints.len())
            .field("overrides", &self.overrides.is_some())
            .finish()
    }
}
