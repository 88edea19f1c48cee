//! Score analysis types for detailed constraint tracking.
//!
//! This module provides types for analyzing constraint matches in detail:
//! which values justify each match, per-constraint totals, score
//! explanations and per-value indictments.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use scoreforge_core::score::{InitScore, Score};
use scoreforge_core::ConstraintRef;

use crate::stream::Value;

/// Identifies one live match within a session.
pub type MatchId = u64;

/// A single constraint match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatch<Sc: Score> {
    /// Reference to the constraint that matched.
    pub constraint_ref: ConstraintRef,
    /// The values of the matched tuple.
    pub justification: Vec<Value>,
    /// Score impact of this match.
    pub score: Sc,
}

/// All live matches of one constraint.
#[derive(Debug, Clone)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Constraint weight (score per unit of match weight).
    pub weight: Sc,
    /// Sum of the scores of all matches.
    pub score: Sc,
    matches: BTreeMap<MatchId, ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn new(constraint_ref: ConstraintRef, weight: Sc) -> Self {
        Self {
            constraint_ref,
            weight,
            score: Sc::zero(),
            matches: BTreeMap::new(),
        }
    }

    pub(crate) fn add_match(&mut self, id: MatchId, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.insert(id, constraint_match);
    }

    pub(crate) fn remove_match(&mut self, id: MatchId) -> Option<ConstraintMatch<Sc>> {
        let removed = self.matches.remove(&id)?;
        self.score = self.score - removed.score;
        Some(removed)
    }

    /// Returns the number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Matches in the order they were made.
    pub fn matches(&self) -> impl Iterator<Item = &ConstraintMatch<Sc>> {
        self.matches.values()
    }

    /// Returns the constraint name.
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// The share of one constraint in an indictment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintImpact<Sc> {
    pub score: Sc,
    pub match_count: usize,
}

/// Analysis of how a single value impacts the score.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    /// The indicted value, usually a fact.
    pub indicted: Value,
    /// Total score impact of matches justified by this value.
    pub score: Sc,
    /// Number of matches justified by this value.
    pub match_count: usize,
    constraints: BTreeMap<ConstraintRef, ConstraintImpact<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    /// Creates a new indictment for a value.
    pub fn new(indicted: Value) -> Self {
        Self {
            indicted,
            score: Sc::zero(),
            match_count: 0,
            constraints: BTreeMap::new(),
        }
    }

    /// Adds a match to this indictment.
    pub fn add_match(&mut self, constraint_ref: &ConstraintRef, score: Sc) {
        self.score = self.score + score;
        self.match_count += 1;
        let impact = self
            .constraints
            .entry(constraint_ref.clone())
            .or_insert(ConstraintImpact {
                score: Sc::zero(),
                match_count: 0,
            });
        impact.score = impact.score + score;
        impact.match_count += 1;
    }

    /// Removes a match added with the same constraint and score.
    pub fn remove_match(&mut self, constraint_ref: &ConstraintRef, score: Sc) {
        self.score = self.score - score;
        self.match_count = self.match_count.saturating_sub(1);
        if let Some(impact) = self.constraints.get_mut(constraint_ref) {
            impact.score = impact.score - score;
            impact.match_count = impact.match_count.saturating_sub(1);
            if impact.match_count == 0 {
                self.constraints.remove(constraint_ref);
            }
        }
    }

    /// Returns the constraint refs for all violated constraints.
    pub fn violated_constraints(&self) -> Vec<&ConstraintRef> {
        self.constraints.keys().collect()
    }

    /// Returns the number of distinct constraints matched.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Returns this value's share of one constraint.
    pub fn impact_of(&self, constraint_ref: &ConstraintRef) -> Option<&ConstraintImpact<Sc>> {
        self.constraints.get(constraint_ref)
    }
}

/// Indictments keyed by the indicted value.
pub type IndictmentMap<Sc> = HashMap<Value, Indictment<Sc>>;

/// Per-constraint breakdown in a score explanation.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    /// Constraint reference.
    pub constraint_ref: ConstraintRef,
    /// Constraint weight.
    pub weight: Sc,
    /// Total score from this constraint.
    pub score: Sc,
    /// Number of matches.
    pub match_count: usize,
    /// Matches, when constraint match tracking is enabled.
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    /// Returns the constraint name.
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// Complete score explanation with per-constraint breakdown.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    /// The total score.
    pub score: InitScore<Sc>,
    /// Per-constraint breakdown, worst score first.
    pub constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
    /// Indictments, worst score first; empty unless match tracking is enabled.
    pub indictments: Vec<Indictment<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    /// Creates a new score explanation, ordering both breakdowns worst first.
    pub fn new(
        score: InitScore<Sc>,
        mut constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
        mut indictments: Vec<Indictment<Sc>>,
    ) -> Self {
        constraint_analyses.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.constraint_ref.cmp(&b.constraint_ref))
        });
        indictments.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.indicted.cmp(&b.indicted)));
        Self {
            score,
            constraint_analyses,
            indictments,
        }
    }

    /// Returns the total match count across all constraints.
    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses.iter().map(|a| a.match_count).sum()
    }

    /// Returns constraints with non-zero scores.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .filter(|a| !a.score.is_zero())
            .collect()
    }

    /// Returns all detailed matches across all constraints.
    pub fn all_matches(&self) -> Vec<&ConstraintMatch<Sc>> {
        self.constraint_analyses
            .iter()
            .flat_map(|a| &a.matches)
            .collect()
    }
}

impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        for analysis in self.non_zero_constraints() {
            writeln!(
                f,
                "  {}: {} ({} matches)",
                analysis.constraint_ref, analysis.score, analysis.match_count
            )?;
        }
        Ok(())
    }
}
