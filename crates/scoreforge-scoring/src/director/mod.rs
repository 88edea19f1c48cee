//! Score director implementations.
//!
//! The score director owns the working solution and its scoring session,
//! and translates the search layer's change notifications into session
//! calls.
//!
//! # Score Director Types
//!
//! - [`BavetScoreDirector`] - Incremental scoring through a compiled session,
//!   with list variable shadow listeners

pub mod bavet;

#[cfg(test)]
mod tests;

pub use bavet::BavetScoreDirector;
