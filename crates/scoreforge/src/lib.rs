//! ScoreForge - incremental constraint scoring in Rust
//!
//! Declare constraints once, then score working solutions incrementally:
//! every change reported to the [`BavetScoreDirector`] is propagated through
//! a compiled node network instead of rescoring the whole solution.
//!
//! # Example
//!
//! ```rust
//! use scoreforge::prelude::*;
//!
//! // Score types are re-exported
//! let score = HardSoftScore::of(0, -100);
//! assert_eq!(score.hard(), 0);
//! assert_eq!(score.soft(), -100);
//! ```

// Score types
pub use scoreforge_core::score::{
    HardMediumSoftScore, HardSoftScore, InitScore, ParseableScore, Score, SimpleScore,
};

// Domain schema
pub use scoreforge_core::domain;
pub use scoreforge_core::{
    ClassId, ConstraintRef, FactRef, ImpactType, PlanningSolution, Result, ScoreForgeError,
    SolutionDescriptor,
};

// Configuration
pub use scoreforge_config::{EnvironmentMode, ScoringConfig};

// Constraint stream API
pub use scoreforge_scoring::stream;

// Sessions and score director
pub use scoreforge_scoring::{
    BavetScoreDirector, ConstraintSession, ConstraintSessionFactory, ConstraintWeightOverrides,
    ScoreExplanation, WeightProvider,
};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::{HardMediumSoftScore, HardSoftScore, InitScore, Score, SimpleScore};
    pub use super::{ClassId, FactRef, PlanningSolution, SolutionDescriptor};
    pub use super::stream::{collector, joiner, ConstraintFactory, Value};
    pub use super::{BavetScoreDirector, ConstraintSessionFactory, ScoringConfig};
}
