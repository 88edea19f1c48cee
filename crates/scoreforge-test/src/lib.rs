//! Shared test fixtures for ScoreForge crates.
//!
//! This crate provides data types and descriptors for testing.
//! It does NOT depend on `scoreforge-scoring` to avoid circular dependencies.
//!
//! - [`route`] - Vehicles with a list variable of visits, whose next/previous/
//!   index/vehicle shadows record every value written to them
//! - [`schedule`] - Shifts assigned to employees, with a class hierarchy
//! - [`sink`] - A `VariableChangeSink` that owns a solution and logs every
//!   before/after notification
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! scoreforge-test = { workspace = true }
//! ```

pub mod route;
pub mod schedule;
pub mod sink;

pub use route::{route_descriptor, RoutePlan, Vehicle, Visit};
pub use schedule::{schedule_descriptor, Employee, Schedule, Shift};
pub use sink::{ChangeEvent, RecordingSink};
