use crate::db::primitives::CaseExpr;
use serde::{Deserialize, Serialize};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// OrderKey
/// One sort key: a named field/annotation, or an inline case expression
/// (used to impose an explicit row order, e.g. identifier -> position).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderKey {
    Field(String),
    Expr(CaseExpr),
}

///
/// OrderSpec
/// Ordered list of sort keys, applied left to right.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderSpec {
    pub keys: Vec<(OrderKey, OrderDirection)>,
}

impl OrderSpec {
    /// Sort by a single expression, ascending.
    #[must_use]
    pub fn by_expr(expr: CaseExpr) -> Self {
        Self {
            keys: vec![(OrderKey::Expr(expr), OrderDirection::Asc)],
        }
    }

    /// Append a field key.
    #[must_use]
    pub fn then_field(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.keys.push((OrderKey::Field(field.into()), direction));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
