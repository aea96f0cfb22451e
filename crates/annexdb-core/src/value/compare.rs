use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by filter, order, and bridge surfaces.
///
/// Ordering rules:
/// 1. Canonical variant rank (Null ranks before everything else)
/// 2. Variant-natural comparison for same-ranked values; Int and Float
///    share a rank and compare numerically
///
/// Mixed-rank comparisons are rank-only and must remain deterministic.
/// Mixed Int/Float comparisons promote the integer to f64 and are only
/// transitive for integers inside the ±2^53 window.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

#[allow(clippy::cast_precision_loss)]
fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Ulid(a), Value::Ulid(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

///
/// CanonicalKey
/// Ord adapter over `canonical_cmp` so values can key ordered collections.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CanonicalKey(pub Value);

impl Ord for CanonicalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for CanonicalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
