// Joiners decide which pairs of a join match.

use std::sync::Arc;

use super::definition::{closure_key, UniMapper};
use super::value::Value;

/// How a join pairs tuples from its two parents.
///
/// # Example
///
/// ```
/// use scoreforge_scoring::stream::joiner::{equal, Joiner};
/// use scoreforge_scoring::stream::Value;
///
/// let same_parity: Joiner<()> = equal(|_: &(), v: &Value| Value::from(v.as_int().unwrap_or(0) % 2));
/// assert_eq!(same_parity.left_key(&(), &Value::Int(3)), Value::Int(1));
/// assert_eq!(same_parity.right_key(&(), &Value::Int(4)), Value::Int(0));
/// ```
pub enum Joiner<S> {
    /// Every left tuple matches every right tuple.
    Cross,
    /// Tuples match when their extracted keys are equal.
    Equal {
        left: UniMapper<S>,
        right: UniMapper<S>,
    },
}

/// Content key of a joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinerKey {
    Cross,
    Equal { left: usize, right: usize },
}

// Creates a joiner matching every pair.
pub fn cross<S>() -> Joiner<S> {
    Joiner::Cross
}

// Creates a joiner that matches when the same key is equal on both sides.
pub fn equal<S, F>(key: F) -> Joiner<S>
where
    F: Fn(&S, &Value) -> Value + Send + Sync + 'static,
{
    equal_shared(Arc::new(key))
}

// Like `equal`, with a key function that other joins may share.
pub fn equal_shared<S>(key: UniMapper<S>) -> Joiner<S> {
    Joiner::Equal {
        left: Arc::clone(&key),
        right: key,
    }
}

// Creates a joiner that matches when the left key equals the right key.
pub fn equal_bi<S, Fa, Fb>(left: Fa, right: Fb) -> Joiner<S>
where
    Fa: Fn(&S, &Value) -> Value + Send + Sync + 'static,
    Fb: Fn(&S, &Value) -> Value + Send + Sync + 'static,
{
    Joiner::Equal {
        left: Arc::new(left),
        right: Arc::new(right),
    }
}

impl<S> Joiner<S> {
    pub fn key(&self) -> JoinerKey {
        match self {
            Joiner::Cross => JoinerKey::Cross,
            Joiner::Equal { left, right } => JoinerKey::Equal {
                left: closure_key(left),
                right: closure_key(right),
            },
        }
    }

    #[inline]
    pub fn left_key(&self, solution: &S, value: &Value) -> Value {
        match self {
            Joiner::Cross => Value::None,
            Joiner::Equal { left, .. } => left(solution, value),
        }
    }

    #[inline]
    pub fn right_key(&self, solution: &S, value: &Value) -> Value {
        match self {
            Joiner::Cross => Value::None,
            Joiner::Equal { right, .. } => right(solution, value),
        }
    }
}

impl<S> Clone for Joiner<S> {
    fn clone(&self) -> Self {
        match self {
            Joiner::Cross => Joiner::Cross,
            Joiner::Equal { left, right } => Joiner::Equal {
                left: Arc::clone(left),
                right: Arc::clone(right),
            },
        }
    }
}
