//! ScoreForge Core - types shared by the scoring network and its callers
//!
//! This crate provides:
//! - Score types and the `Score` trait
//! - Constraint identity (`ConstraintRef`, `ImpactType`)
//! - The explicit domain schema (`SolutionDescriptor`) and fact addressing
//! - Shadow variable listeners for list variables
//! - The error taxonomy shared by every ScoreForge crate

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{ClassId, FactRef, PlanningSolution, SolutionDescriptor};
pub use error::{Result, ScoreForgeError};
pub use score::{
    HardMediumSoftScore, HardSoftScore, InitScore, ParseableScore, Score, ScoreLevel,
    ScoreParseError, SimpleScore,
};
