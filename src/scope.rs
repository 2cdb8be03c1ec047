//! Scopes partition a collection into independent position sequences.
//!
//! A scope is the list of `(field, value)` pairs a record must match. The
//! empty scope matches every record of the collection.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Value of a scope field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<i64> for ScopeValue {
    fn from(value: i64) -> ScopeValue {
        return ScopeValue::Int(value);
    }
}

impl From<i32> for ScopeValue {
    fn from(value: i32) -> ScopeValue {
        return ScopeValue::Int(i64::from(value));
    }
}

impl From<u32> for ScopeValue {
    fn from(value: u32) -> ScopeValue {
        return ScopeValue::Int(i64::from(value));
    }
}

impl From<bool> for ScopeValue {
    fn from(value: bool) -> ScopeValue {
        return ScopeValue::Bool(value);
    }
}

impl From<&str> for ScopeValue {
    fn from(value: &str) -> ScopeValue {
        return ScopeValue::Text(value.to_string());
    }
}

impl From<String> for ScopeValue {
    fn from(value: String) -> ScopeValue {
        return ScopeValue::Text(value);
    }
}

impl<T: Into<ScopeValue>> From<Option<T>> for ScopeValue {
    fn from(value: Option<T>) -> ScopeValue {
        return value.map_or(ScopeValue::Null, Into::into);
    }
}

impl fmt::Display for ScopeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            ScopeValue::Null => write!(f, "null"),
            ScopeValue::Bool(b) => write!(f, "{}", b),
            ScopeValue::Int(i) => write!(f, "{}", i),
            ScopeValue::Text(s) => write!(f, "{:?}", s),
        };
    }
}

/// A set of field constraints selecting one partition of a collection.
///
/// Most collections are scoped by zero or one field, so the pairs live
/// inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    fields: SmallVec<[(String, ScopeValue); 2]>,
}

impl Scope {
    /// The scope matching every record.
    pub fn unscoped() -> Scope {
        return Scope::default();
    }

    /// Add a constraint. A later constraint on the same field replaces the
    /// earlier one.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ScopeValue>) -> Scope {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        return self;
    }

    /// Build a scope by reading each field through `lookup`.
    /// Fields the lookup does not know are constrained to `Null`.
    pub fn from_fields<'a, I, F>(fields: I, mut lookup: F) -> Scope
    where
        I: IntoIterator<Item = &'a String>,
        F: FnMut(&str) -> Option<ScopeValue>,
    {
        let mut scope = Scope::unscoped();
        for field in fields {
            let value = lookup(field).unwrap_or(ScopeValue::Null);
            scope = scope.with(field.clone(), value);
        }
        return scope;
    }

    pub fn is_unscoped(&self) -> bool {
        return self.fields.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.fields.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.fields.is_empty();
    }

    /// The constraint on `field`, if any.
    pub fn get(&self, field: &str) -> Option<&ScopeValue> {
        return self
            .fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeValue)> {
        return self.fields.iter().map(|(name, value)| (name.as_str(), value));
    }

    /// Whether a record whose fields are read through `lookup` belongs to
    /// this scope. Missing fields compare as `Null`.
    pub fn matches<F>(&self, mut lookup: F) -> bool
    where
        F: FnMut(&str) -> Option<ScopeValue>,
    {
        return self.fields.iter().all(|(name, expected)| {
            let actual = lookup(name).unwrap_or(ScopeValue::Null);
            actual == *expected
        });
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "*");
        }
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        return Ok(());
    }
}
