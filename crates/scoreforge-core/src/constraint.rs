//! Constraint identity and impact direction.

use std::fmt;

use crate::score::Score;

/// Reference to a constraint for identification.
///
/// # Example
///
/// ```
/// use scoreforge_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("scheduling", "NoOverlap");
/// assert_eq!(cr.full_name(), "scheduling/NoOverlap");
///
/// let simple = ConstraintRef::new("", "Simple");
/// assert_eq!(simple.full_name(), "Simple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package/module containing the constraint.
    pub package: String,
    /// Name of the constraint.
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name, `package/name`.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Direction in which a constraint moves the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Penalize (subtract from score).
    Penalty,
    /// Reward (add to score).
    Reward,
}

impl ImpactType {
    /// Signs a positive weighted impact according to this direction.
    ///
    /// ```
    /// use scoreforge_core::{HardSoftScore, ImpactType};
    ///
    /// let w = HardSoftScore::of_soft(3);
    /// assert_eq!(ImpactType::Penalty.apply(w), HardSoftScore::of_soft(-3));
    /// assert_eq!(ImpactType::Reward.apply(w), w);
    /// ```
    #[inline]
    pub fn apply<Sc: Score>(self, impact: Sc) -> Sc {
        match self {
            ImpactType::Penalty => -impact,
            ImpactType::Reward => impact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::SimpleScore;

    #[test]
    fn test_constraint_ref_display() {
        let cr = ConstraintRef::new("my.package", "TestConstraint");
        assert_eq!(cr.to_string(), "my.package/TestConstraint");
    }

    #[test]
    fn test_impact_sign() {
        assert_eq!(
            ImpactType::Penalty.apply(SimpleScore::of(2)),
            SimpleScore::of(-2)
        );
        assert_eq!(ImpactType::Reward.apply(SimpleScore::of(2)), SimpleScore::of(2));
    }
}
