//! Constraint definitions.

use std::fmt;
use std::sync::Arc;

use scoreforge_core::score::Score;
use scoreforge_core::{ConstraintRef, ImpactType};

use super::definition::{StreamId, StreamKey, StreamOp, TupleWeigher, WeightExtractor};
use super::factory::ConstraintFactory;

/// Where a constraint's weight comes from.
///
/// Weights are resolved against the working solution every time a session
/// is built.
pub enum ConstraintWeight<S, Sc> {
    /// A fixed weight.
    Fixed(Sc),
    /// Read from the configured weight providers, falling back to the default.
    Configurable(Sc),
    /// Computed from the working solution.
    Extracted(WeightExtractor<S, Sc>),
}

impl<S, Sc: Score> ConstraintWeight<S, Sc> {
    pub fn is_configurable(&self) -> bool {
        matches!(self, ConstraintWeight::Configurable(_))
    }
}

impl<S, Sc: Clone> Clone for ConstraintWeight<S, Sc> {
    fn clone(&self) -> Self {
        match self {
            ConstraintWeight::Fixed(w) => ConstraintWeight::Fixed(w.clone()),
            ConstraintWeight::Configurable(w) => ConstraintWeight::Configurable(w.clone()),
            ConstraintWeight::Extracted(f) => ConstraintWeight::Extracted(Arc::clone(f)),
        }
    }
}

impl<S, Sc: fmt::Debug> fmt::Debug for ConstraintWeight<S, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintWeight::Fixed(w) => f.debug_tuple("Fixed").field(w).finish(),
            ConstraintWeight::Configurable(w) => f.debug_tuple("Configurable").field(w).finish(),
            ConstraintWeight::Extracted(_) => f.write_str("Extracted(..)"),
        }
    }
}

/// A declared constraint.
pub(crate) struct ConstraintDef<S, Sc> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact: ImpactType,
    pub(crate) weight: ConstraintWeight<S, Sc>,
    // Per-match multiplier of the weight; 1 when absent.
    pub(crate) weigher: Option<TupleWeigher<S>>,
    // The scoring stream, whose parent is the constrained stream.
    pub(crate) stream: StreamId,
}

/// Finishes a constraint: names it and registers it with the factory.
///
/// # Example
///
/// ```
/// use scoreforge_core::{ClassId, HardSoftScore};
/// use scoreforge_scoring::stream::ConstraintFactory;
///
/// let factory = ConstraintFactory::<(), HardSoftScore>::new();
/// let constraint = factory
///     .for_each(ClassId(0))
///     .penalize(HardSoftScore::ONE_HARD)
///     .in_package("rooms")
///     .as_constraint("Room conflict");
///
/// assert_eq!(constraint.full_name(), "rooms/Room conflict");
/// ```
#[must_use = "a constraint is only registered by `as_constraint`"]
pub struct ConstraintBuilder<'f, S, Sc: Score> {
    factory: &'f ConstraintFactory<S, Sc>,
    parent: StreamId,
    impact: ImpactType,
    weight: ConstraintWeight<S, Sc>,
    weigher: Option<TupleWeigher<S>>,
    package: String,
}

impl<'f, S, Sc> ConstraintBuilder<'f, S, Sc>
where
    S: Send + Sync + 'static,
    Sc: Score,
{
    pub(crate) fn new(
        factory: &'f ConstraintFactory<S, Sc>,
        parent: StreamId,
        impact: ImpactType,
        weight: ConstraintWeight<S, Sc>,
        weigher: Option<TupleWeigher<S>>,
    ) -> Self {
        Self {
            factory,
            parent,
            impact,
            weight,
            weigher,
            package: String::new(),
        }
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Registers the constraint and returns its reference.
    pub fn as_constraint(self, name: impl Into<String>) -> ConstraintRef {
        let constraint_ref = ConstraintRef::new(self.package, name);
        let parent = self.parent;
        let impact = self.impact;
        let weight = self.weight;
        let weigher = self.weigher;
        let registered = constraint_ref.clone();
        self.factory.with_inner(move |inner| {
            let constraint = inner.constraints.len();
            let stream = inner.share_attached(
                StreamKey::Scoring { parent, constraint },
                StreamOp::Scoring { parent, constraint },
            );
            inner.constraints.push(ConstraintDef {
                constraint_ref: registered,
                impact,
                weight,
                weigher,
                stream,
            });
        });
        constraint_ref
    }
}
