// Runtime constraint weight configuration.
//
// Weights are resolved every time a session is built, so changing an
// override takes effect on the next working solution replacement.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use scoreforge_config::ScoringConfig;
use scoreforge_core::score::{ParseableScore, Score};
use scoreforge_core::{ConstraintRef, Result, ScoreForgeError};

// Holds runtime overrides for constraint weights.
//
// Keys are constraint full names (`package/name`) or bare names; a full
// name match takes precedence.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: HashMap<String, Sc>,
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintWeightOverrides")
            .field("count", &self.weights.len())
            .finish()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    // Creates an empty overrides container.
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    // Creates overrides from an iterator of (name, weight) pairs.
    pub fn from_pairs<I, N>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, Sc)>,
        N: Into<String>,
    {
        let weights = iter.into_iter().map(|(n, w)| (n.into(), w)).collect();
        Self { weights }
    }

    // Parses the `constraint_weights` table of a scoring configuration.
    pub fn from_config(config: &ScoringConfig) -> Result<Self>
    where
        Sc: ParseableScore,
    {
        let mut overrides = Self::new();
        for (name, text) in &config.constraint_weights {
            let weight = Sc::parse(text).map_err(|e| {
                ScoreForgeError::Config(format!(
                    "constraint weight for ({}) is not a valid score ({}): {}",
                    name, text, e
                ))
            })?;
            overrides.put(name.clone(), weight);
        }
        Ok(overrides)
    }

    // Sets the weight for a constraint.
    pub fn put<N: Into<String>>(&mut self, name: N, weight: Sc) {
        self.weights.insert(name.into(), weight);
    }

    // Removes the override for a constraint.
    pub fn remove(&mut self, name: &str) -> Option<Sc> {
        self.weights.remove(name)
    }

    // Gets the overridden weight, or returns the default if not overridden.
    pub fn get_or_default(&self, name: &str, default: Sc) -> Sc {
        self.weights.get(name).copied().unwrap_or(default)
    }

    // Gets the overridden weight if present.
    pub fn get(&self, name: &str) -> Option<&Sc> {
        self.weights.get(name)
    }

    // Returns true if this constraint has an override.
    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    // Returns the number of overrides.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    // Returns true if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    // Clears all overrides.
    pub fn clear(&mut self) {
        self.weights.clear();
    }

    // Creates an Arc-wrapped version for sharing across threads.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// Source of constraint weights, looked up by constraint name.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    // Gets the weight for a constraint by name.
    fn weight(&self, name: &str) -> Option<Sc>;

    // Gets the weight or returns the default.
    fn weight_or_default(&self, name: &str, default: Sc) -> Sc {
        self.weight(name).unwrap_or(default)
    }

    // Looks up the full name first, then the bare name.
    fn weight_of(&self, constraint: &ConstraintRef) -> Option<Sc> {
        self.weight(&constraint.full_name())
            .or_else(|| self.weight(&constraint.name))
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name).copied()
    }
}

impl<Sc: Score> WeightProvider<Sc> for Arc<ConstraintWeightOverrides<Sc>> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name).copied()
    }
}
