//! Runtime filter evaluation over materialized rows.
//!
//! Comparison semantics: `Null` never matches an ordering or equality
//! operator (use `IsNull`/`IsNotNull` for presence checks); ordering
//! comparisons use the canonical total order.

use crate::{
    db::{
        primitives::{Cmp, FilterClause, FilterExpr},
        response::Row,
    },
    traits::{EntityValue, FieldValues},
    value::{Value, canonical_cmp},
};
use std::cmp::Ordering;

/// Resolve a field or annotation name against a row. Annotation names
/// cannot shadow stored fields (enforced at validation), so lookup
/// order is not observable.
pub(crate) fn row_value<E: EntityValue>(row: &Row<E>, field: &str) -> Value {
    if let Some(value) = row.annotations.get(field) {
        return value.clone();
    }

    row.entity.field_value(field).unwrap_or(Value::Null)
}

pub(crate) fn filter_matches<E: EntityValue>(row: &Row<E>, expr: &FilterExpr) -> bool {
    match expr {
        FilterExpr::True => true,
        FilterExpr::False => false,
        FilterExpr::Clause(clause) => clause_matches(&row_value(row, &clause.field), clause),
        FilterExpr::And(children) => children.iter().all(|child| filter_matches(row, child)),
        FilterExpr::Or(children) => children.iter().any(|child| filter_matches(row, child)),
        FilterExpr::Not(inner) => !filter_matches(row, inner),
    }
}

fn clause_matches(lhs: &Value, clause: &FilterClause) -> bool {
    let rhs = &clause.value;

    match clause.cmp {
        Cmp::IsNull => lhs.is_null(),
        Cmp::IsNotNull => !lhs.is_null(),
        _ if lhs.is_null() || rhs.is_null() => false,
        Cmp::Eq => lhs == rhs,
        Cmp::Ne => lhs != rhs,
        Cmp::Lt => canonical_cmp(lhs, rhs) == Ordering::Less,
        Cmp::Lte => canonical_cmp(lhs, rhs) != Ordering::Greater,
        Cmp::Gt => canonical_cmp(lhs, rhs) == Ordering::Greater,
        Cmp::Gte => canonical_cmp(lhs, rhs) != Ordering::Less,
        Cmp::In => list_contains(rhs, lhs),
        Cmp::NotIn => !list_contains(rhs, lhs),
        Cmp::Contains => contains(lhs, rhs),
        Cmp::StartsWith => text_pair(lhs, rhs).is_some_and(|(l, r)| l.starts_with(r)),
        Cmp::EndsWith => text_pair(lhs, rhs).is_some_and(|(l, r)| l.ends_with(r)),
    }
}

fn list_contains(list: &Value, needle: &Value) -> bool {
    match list {
        Value::List(items) => items.contains(needle),
        _ => false,
    }
}

fn contains(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Text(l), Value::Text(r)) => l.contains(r.as_str()),
        (Value::List(items), needle) => items.contains(needle),
        _ => false,
    }
}

fn text_pair<'a>(lhs: &'a Value, rhs: &'a Value) -> Option<(&'a str, &'a str)> {
    match (lhs, rhs) {
        (Value::Text(l), Value::Text(r)) => Some((l.as_str(), r.as_str())),
        _ => None,
    }
}
