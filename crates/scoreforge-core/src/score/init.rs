//! Scores paired with the number of still-uninitialized variables.

use std::cmp::Ordering;
use std::fmt;

use super::traits::Score;

/// A score seeded with an init score.
///
/// The init score is zero for a fully initialized solution and
/// `-n` when `n` genuine variables are still unassigned. It is compared
/// before every score level, so any initialized solution beats any
/// uninitialized one.
///
/// ```
/// use scoreforge_core::{HardSoftScore, InitScore};
///
/// let partial = InitScore::of(-1, HardSoftScore::ZERO);
/// let full = InitScore::of(0, HardSoftScore::of_soft(-50));
/// assert!(full > partial);
/// assert_eq!(partial.to_string(), "-1init/0hard/0soft");
/// assert_eq!(full.to_string(), "0hard/-50soft");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InitScore<Sc> {
    init_score: i32,
    score: Sc,
}

impl<Sc: Score> InitScore<Sc> {
    pub fn of(init_score: i32, score: Sc) -> Self {
        Self { init_score, score }
    }

    /// A score for a fully initialized solution.
    pub fn initialized(score: Sc) -> Self {
        Self::of(0, score)
    }

    pub fn init_score(&self) -> i32 {
        self.init_score
    }

    pub fn score(&self) -> Sc {
        self.score
    }

    pub fn is_solution_initialized(&self) -> bool {
        self.init_score >= 0
    }
}

impl<Sc: Score> PartialOrd for InitScore<Sc> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Sc: Score> Ord for InitScore<Sc> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.init_score
            .cmp(&other.init_score)
            .then_with(|| self.score.cmp(&other.score))
    }
}

impl<Sc: Score> fmt::Display for InitScore<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.init_score == 0 {
            write!(f, "{}", self.score)
        } else {
            write!(f, "{}init/{}", self.init_score, self.score)
        }
    }
}
