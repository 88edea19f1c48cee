//! Core Score trait definition

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use super::ScoreLevel;

/// Core trait for all score types in ScoreForge.
///
/// A score is what the scoring network accumulates: every constraint match
/// adds a weighted contribution, and undoing the match subtracts it again.
/// Because contributions are added and subtracted in arbitrary order, the
/// arithmetic must be exact (integer levels only).
///
/// When comparing scores, higher-priority levels are compared first.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + Hash
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if all hard levels are non-negative.
    fn is_feasible(&self) -> bool;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns true if every level is zero.
    ///
    /// A constraint whose weight is zero never reaches the compiled network.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the score values ordered from highest to lowest priority.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from level numbers.
    ///
    /// # Panics
    /// Panics if the number of levels doesn't match `levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Multiplies every level by an integer factor.
    ///
    /// This is how a constraint weight is combined with a per-match weight.
    fn scale(&self, factor: i64) -> Self;

    /// Multiplies this score by a scalar, rounding each level.
    fn multiply(&self, multiplicand: f64) -> Self;

    /// Divides this score by a scalar, rounding each level.
    fn divide(&self, divisor: f64) -> Self;

    /// Returns the absolute value of this score.
    fn abs(&self) -> Self;

    /// Returns the semantic label for the score level at the given index.
    ///
    /// # Panics
    /// Panics if `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Compares two scores, returning the ordering.
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if this score is better than the other score.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is worse than the other score.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }
}

/// Scores that can be parsed from and rendered to their text form.
///
/// Used by configuration to read constraint weight overrides.
pub trait ParseableScore: Score {
    /// Parses a score from a string representation.
    ///
    /// # Format
    /// - SimpleScore: "42"
    /// - HardSoftScore: "0hard/-100soft"
    /// - HardMediumSoftScore: "0hard/0medium/-100soft"
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation of this score.
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Score parse error: {message}")]
pub struct ScoreParseError {
    pub message: String,
}

impl ScoreParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
