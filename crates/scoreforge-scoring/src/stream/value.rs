//! Values carried by tuples.

use std::fmt;
use std::sync::Arc;

use scoreforge_core::FactRef;
use smallvec::SmallVec;

/// One slot of a tuple.
///
/// Facts travel by reference; derived values (mapped values, group keys,
/// aggregates) travel by value. Values are hashable so they can key join
/// indexes, groups and indictments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    Fact(FactRef),
}

impl Value {
    /// Returns the fact reference, if this value is a fact.
    #[inline]
    pub fn as_fact(&self) -> Option<FactRef> {
        match *self {
            Value::Fact(fact) => Some(fact),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(&**v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl From<FactRef> for Value {
    fn from(fact: FactRef) -> Self {
        Value::Fact(fact)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Fact(fact) => write!(f, "{}", fact),
        }
    }
}

/// The values of one tuple, in stream order.
pub type Tuple = SmallVec<[Value; 2]>;
