mod compare;

pub use compare::canonical_cmp;
pub(crate) use compare::CanonicalKey;

use crate::types::Ulid;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// Value
/// Scalar value usable in filters, annotations, and sort keys.
///
/// Null → the field's value is absent (SQL NULL); also the no-match
///        fallback of a case expression.
/// Unit → internal RHS placeholder for presence checks; not a real value.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<Value>),
    Null,
    Text(String),
    Ulid(Ulid),
    Unit,
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Variant rank used as the first key of the canonical total order.
    ///
    /// Int and Float share a rank so that numeric values compare
    /// numerically across representations.
    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Float(_) | Self::Int(_) => 2,
            Self::Text(_) => 3,
            Self::Ulid(_) => 4,
            Self::List(_) => 5,
            Self::Unit => 6,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Ulid(_) => "ulid",
            Self::Unit => "unit",
        }
    }
}

// Equality is defined by the canonical comparator so that Int(1) and
// Float(1.0) are the same value wherever values are matched.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        canonical_cmp(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Null => write!(f, "null"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Ulid(v) => write!(f, "{v}"),
            Self::Unit => write!(f, "()"),
        }
    }
}
