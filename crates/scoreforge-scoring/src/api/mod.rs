//! Analysis and weight configuration API.
//!
//! This module provides:
//! - Analysis types for match totals, indictments and score explanation
//! - Runtime weight override configuration

pub mod analysis;
pub mod weight_overrides;

#[cfg(test)]
mod tests;

pub use analysis::{
    ConstraintAnalysis, ConstraintImpact, ConstraintMatch, ConstraintMatchTotal, Indictment,
    IndictmentMap, MatchId, ScoreExplanation,
};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
