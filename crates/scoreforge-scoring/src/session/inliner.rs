//! Score inliner: turns weighted matches into a score.

use std::collections::{BTreeMap, HashMap};

use scoreforge_core::score::{InitScore, Score};
use scoreforge_core::{ConstraintRef, ImpactType};

use crate::api::analysis::{
    ConstraintAnalysis, ConstraintMatch, ConstraintMatchTotal, Indictment, IndictmentMap,
    MatchId, ScoreExplanation,
};
use crate::stream::Value;

/// Per-constraint accumulator.
#[derive(Debug, Clone)]
struct ConstraintScore<Sc> {
    constraint_ref: ConstraintRef,
    impact: ImpactType,
    weight: Sc,
    score: Sc,
    match_count: usize,
}

/// Reverses exactly one [`ScoreInliner::impact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "dropping an undo handle leaves its impact in the score forever"]
pub struct UndoHandle<Sc> {
    constraint: usize,
    score: Sc,
    match_id: Option<MatchId>,
}

impl<Sc: Copy> UndoHandle<Sc> {
    /// The score this match contributed.
    pub fn score(&self) -> Sc {
        self.score
    }
}

/// Accumulates the weighted matches of one session.
///
/// Every match is recorded against its constraint and yields an
/// [`UndoHandle`]; the score is always the sum of the matches that have not
/// been undone. With tracking enabled the inliner also keeps a
/// [`ConstraintMatchTotal`] per matched constraint and an [`Indictment`] per
/// justifying value; both entries disappear with their last match.
///
/// # Example
///
/// ```
/// use scoreforge_core::{ConstraintRef, ImpactType, SimpleScore};
/// use scoreforge_scoring::session::ScoreInliner;
///
/// let mut inliner = ScoreInliner::new(
///     vec![(ConstraintRef::new("", "Cost"), ImpactType::Penalty, SimpleScore::of(2))],
///     false,
/// );
/// let a = inliner.impact(0, 1, &[]);
/// let b = inliner.impact(0, 3, &[]);
/// assert_eq!(inliner.score(), SimpleScore::of(-8));
///
/// inliner.undo(a);
/// assert_eq!(inliner.score(), SimpleScore::of(-6));
/// inliner.undo(b);
/// assert_eq!(inliner.score(), SimpleScore::of(0));
/// ```
#[derive(Debug)]
pub struct ScoreInliner<Sc: Score> {
    constraints: Vec<ConstraintScore<Sc>>,
    tracking: bool,
    next_match: MatchId,
    totals: BTreeMap<String, ConstraintMatchTotal<Sc>>,
    indictments: IndictmentMap<Sc>,
}

impl<Sc: Score> ScoreInliner<Sc> {
    /// Creates an inliner for constraints given as `(ref, impact, weight)`.
    ///
    /// Constraints are addressed by their position in `constraints`.
    pub fn new(constraints: Vec<(ConstraintRef, ImpactType, Sc)>, tracking: bool) -> Self {
        Self {
            constraints: constraints
                .into_iter()
                .map(|(constraint_ref, impact, weight)| ConstraintScore {
                    constraint_ref,
                    impact,
                    weight,
                    score: Sc::zero(),
                    match_count: 0,
                })
                .collect(),
            tracking,
            next_match: 0,
            totals: BTreeMap::new(),
            indictments: HashMap::new(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn weight(&self, constraint: usize) -> Option<Sc> {
        self.constraints.get(constraint).map(|c| c.weight)
    }

    /// Records one match of `constraint`.
    ///
    /// The match contributes the constraint weight scaled by
    /// `match_weight`, signed by the constraint's impact type.
    pub fn impact(
        &mut self,
        constraint: usize,
        match_weight: i64,
        justification: &[Value],
    ) -> UndoHandle<Sc> {
        let state = &mut self.constraints[constraint];
        let score = state.impact.apply(state.weight.scale(match_weight));
        state.score = state.score + score;
        state.match_count += 1;

        let match_id = if self.tracking {
            let id = self.next_match;
            self.next_match += 1;
            self.track(constraint, id, score, justification);
            Some(id)
        } else {
            None
        };
        UndoHandle {
            constraint,
            score,
            match_id,
        }
    }

    /// Reverses a match recorded by [`impact`](Self::impact).
    pub fn undo(&mut self, handle: UndoHandle<Sc>) {
        let state = &mut self.constraints[handle.constraint];
        state.score = state.score - handle.score;
        state.match_count -= 1;
        if let Some(id) = handle.match_id {
            self.untrack(handle.constraint, id);
        }
    }

    /// Sum of every live match.
    pub fn score(&self) -> Sc {
        self.constraints
            .iter()
            .fold(Sc::zero(), |total, c| total + c.score)
    }

    pub fn extract_score(&self, init_score: i32) -> InitScore<Sc> {
        InitScore::of(init_score, self.score())
    }

    /// Score and match count of one constraint.
    pub fn constraint_score(&self, constraint: usize) -> Option<(Sc, usize)> {
        self.constraints
            .get(constraint)
            .map(|c| (c.score, c.match_count))
    }

    /// Match totals keyed by constraint full name; empty unless tracking.
    pub fn constraint_match_totals(&self) -> &BTreeMap<String, ConstraintMatchTotal<Sc>> {
        &self.totals
    }

    /// Indictments keyed by justifying value; empty unless tracking.
    pub fn indictments(&self) -> &IndictmentMap<Sc> {
        &self.indictments
    }

    /// Builds an explanation of the current score.
    ///
    /// Scores and match counts are always known; individual matches and
    /// indictments only when tracking.
    pub fn explain(&self, init_score: i32) -> ScoreExplanation<Sc> {
        let analyses = self
            .constraints
            .iter()
            .map(|c| ConstraintAnalysis {
                constraint_ref: c.constraint_ref.clone(),
                weight: c.weight,
                score: c.score,
                match_count: c.match_count,
                matches: self
                    .totals
                    .get(&c.constraint_ref.full_name())
                    .map(|t| t.matches().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect();
        ScoreExplanation::new(
            self.extract_score(init_score),
            analyses,
            self.indictments.values().cloned().collect(),
        )
    }

    fn track(&mut self, constraint: usize, id: MatchId, score: Sc, justification: &[Value]) {
        let state = &self.constraints[constraint];
        let constraint_ref = &state.constraint_ref;
        let weight = state.weight;
        self.totals
            .entry(constraint_ref.full_name())
            .or_insert_with(|| ConstraintMatchTotal::new(constraint_ref.clone(), weight))
            .add_match(
                id,
                ConstraintMatch {
                    constraint_ref: constraint_ref.clone(),
                    justification: justification.to_vec(),
                    score,
                },
            );
        for value in indicted(justification) {
            self.indictments
                .entry(value.clone())
                .or_insert_with(|| Indictment::new(value.clone()))
                .add_match(constraint_ref, score);
        }
    }

    fn untrack(&mut self, constraint: usize, id: MatchId) {
        let name = self.constraints[constraint].constraint_ref.full_name();
        let Some(total) = self.totals.get_mut(&name) else {
            return;
        };
        let Some(removed) = total.remove_match(id) else {
            return;
        };
        if total.match_count() == 0 {
            self.totals.remove(&name);
        }
        for value in indicted(&removed.justification) {
            if let Some(indictment) = self.indictments.get_mut(value) {
                indictment.remove_match(&removed.constraint_ref, removed.score);
                if indictment.match_count == 0 {
                    self.indictments.remove(value);
                }
            }
        }
    }
}

// Distinct non-empty values of a justification.
fn indicted(justification: &[Value]) -> impl Iterator<Item = &Value> {
    justification
        .iter()
        .enumerate()
        .filter(|(i, v)| !v.is_none() && !justification[..*i].contains(*v))
        .map(|(_, v)| v)
}
