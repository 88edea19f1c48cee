//! Incremental constraint scoring for ScoreForge.
//!
//! This crate provides the scoring network:
//! - A fluent constraint stream API whose structurally equal streams are shared
//! - A graph compiler turning declared constraints into a node network
//! - Sessions that propagate fact changes through the network
//! - A score director adapting the search layer's lifecycle to a session
//!
//! # Architecture
//!
//! Streams are declared once per [`ConstraintSessionFactory`]. Each working
//! solution gets its own [`ConstraintSession`], built with the constraint
//! weights resolved for that solution; constraints weighted zero are pruned
//! before compilation.

// Stream closures are stored as `Arc<dyn Fn>` behind several layers of generics
#![allow(clippy::type_complexity)]

pub mod api;
pub mod director;
pub mod session;
pub mod stream;

// ============================================================================
// Constraint Streams
// ============================================================================

pub use stream::{
    collector, joiner, BiConstraintStream, Collector, ConstraintBuilder, ConstraintFactory,
    ConstraintWeight, ExistenceMode, Joiner, Tuple, UniConstraintStream, Value,
};

// ============================================================================
// Sessions
// ============================================================================

pub use session::{
    ConstraintSession, ConstraintSessionFactory, ScoreInliner, SolutionWeights, UndoHandle,
};

// ============================================================================
// Score Directors
// ============================================================================

pub use director::BavetScoreDirector;

// ============================================================================
// Analysis and Weights
// ============================================================================

pub use api::analysis::{
    ConstraintAnalysis, ConstraintImpact, ConstraintMatch, ConstraintMatchTotal, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};
