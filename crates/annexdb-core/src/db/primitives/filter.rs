use crate::{traits::FieldValue, value::Value};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

///
/// Cmp
/// Comparison operators available in filter clauses.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Cmp {
    Contains,
    EndsWith,
    Eq,
    Gt,
    Gte,
    In,
    IsNotNull,
    IsNull,
    Lt,
    Lte,
    Ne,
    NotIn,
    StartsWith,
}

///
/// FilterExpr
///
/// Represents logical expressions for querying/filtering data.
///
/// Expressions can be:
/// - `True` or `False` constants
/// - Single clauses comparing a field with a value
/// - Composite expressions: `And`, `Or`, and negation `Not`.
///
/// Clause fields may name stored fields or attached annotations.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum FilterExpr {
    #[default]
    True,
    False,
    Clause(FilterClause),
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
}

impl FilterExpr {
    // --- Clause ---

    /// Create a single clause: `field cmp value`.
    pub fn clause(field: impl Into<String>, cmp: Cmp, value: impl FieldValue) -> Self {
        Self::Clause(FilterClause::new(field, cmp, value))
    }

    // --- Equality ---

    pub fn eq(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Ne, value)
    }

    // --- Ordering ---

    pub fn lt(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Gte, value)
    }

    // --- Text / Collection ---

    pub fn contains(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Contains, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::StartsWith, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::EndsWith, value)
    }

    // --- Presence ---

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::clause(field, Cmp::IsNull, ())
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::clause(field, Cmp::IsNotNull, ())
    }

    // --- Membership ---

    pub fn in_iter<I>(field: impl Into<String>, vals: I) -> Self
    where
        I: IntoIterator,
        I::Item: FieldValue,
    {
        Self::clause(
            field,
            Cmp::In,
            vals.into_iter().map(FieldValue::to_value).collect::<Vec<_>>(),
        )
    }

    pub fn not_in_iter<I>(field: impl Into<String>, vals: I) -> Self
    where
        I: IntoIterator,
        I::Item: FieldValue,
    {
        Self::clause(
            field,
            Cmp::NotIn,
            vals.into_iter().map(FieldValue::to_value).collect::<Vec<_>>(),
        )
    }

    /// Combine two expressions into an `And` expression.
    ///
    /// This flattens nested `And`s to avoid deep nesting (e.g., `(a AND b) AND c`
    /// becomes `AND[a,b,c]`).
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(mut b)) => {
                a.append(&mut b);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::And(list)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Negate this expression.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Combine two expressions into an `Or` expression,
    /// flattening nested `Or`s similarly to `and`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut a), Self::Or(mut b)) => {
                a.append(&mut b);
                Self::Or(a)
            }
            (Self::Or(mut a), b) => {
                a.push(b);
                Self::Or(a)
            }
            (a, Self::Or(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::Or(list)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Simplifies the logical expression recursively, applying rules like:
    /// - Eliminate double negation `NOT NOT x` -> `x`
    /// - Apply De Morgan's laws
    /// - Flatten nested `And` and `Or` expressions
    /// - Remove neutral elements and short circuit on constants
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::Not(inner) => match *inner {
                Self::True => Self::False,
                Self::False => Self::True,
                Self::Not(inner2) => (*inner2).simplify(),
                Self::And(children) => {
                    // De Morgan's: NOT(AND(...)) == OR(NOT(...))
                    Self::Or(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                Self::Or(children) => {
                    // De Morgan's: NOT(OR(...)) == AND(NOT(...))
                    Self::And(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                x @ Self::Clause(_) => Self::Not(Box::new(x.simplify())),
            },

            Self::And(children) => {
                let flat = Self::simplify_children(children, |e| matches!(e, Self::And(_)));

                if flat.iter().any(|e| matches!(e, Self::False)) {
                    Self::False
                } else {
                    let filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::True))
                        .collect();

                    match filtered.len() {
                        0 => Self::True,
                        1 => filtered.into_iter().next().unwrap(),
                        _ => Self::And(filtered),
                    }
                }
            }

            Self::Or(children) => {
                let flat = Self::simplify_children(children, |e| matches!(e, Self::Or(_)));

                if flat.iter().any(|e| matches!(e, Self::True)) {
                    Self::True
                } else {
                    let filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::False))
                        .collect();

                    match filtered.len() {
                        0 => Self::False,
                        1 => filtered.into_iter().next().unwrap(),
                        _ => Self::Or(filtered),
                    }
                }
            }

            // Clauses and constants are already simplest forms
            x => x,
        }
    }

    fn simplify_children(children: Vec<Self>, flatten_if: fn(&Self) -> bool) -> Vec<Self> {
        let mut flat = Vec::with_capacity(children.len());

        for child in children {
            let simplified = child.simplify();
            if flatten_if(&simplified) {
                if let Self::And(nested) | Self::Or(nested) = simplified {
                    flat.extend(nested);
                }
            } else {
                flat.push(simplified);
            }
        }

        flat
    }

    /// Visit every clause in the expression tree.
    pub fn for_each_clause(&self, f: &mut impl FnMut(&FilterClause)) {
        match self {
            Self::Clause(clause) => f(clause),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.for_each_clause(f);
                }
            }
            Self::Not(inner) => inner.for_each_clause(f),
            Self::True | Self::False => {}
        }
    }
}

///
/// Bit Operations
/// allow us to do | and & on expressions
///

impl BitAnd for FilterExpr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for FilterExpr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for FilterExpr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

///
/// FilterClause
/// represents a basic comparison expression: `field cmp value`
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterClause {
    pub field: String,
    pub cmp: Cmp,
    pub value: Value,
}

impl FilterClause {
    #[must_use]
    pub fn new(field: impl Into<String>, cmp: Cmp, value: impl FieldValue) -> Self {
        Self {
            field: field.into(),
            cmp,
            value: value.to_value(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(field: &str) -> FilterExpr {
        FilterExpr::Clause(FilterClause::new(field, Cmp::Eq, "foo"))
    }

    #[test]
    fn constructors_build_expected_clauses() {
        fn assert_clause(expr: FilterExpr, field: &str, cmp: Cmp, value: Value) {
            match expr {
                FilterExpr::Clause(c) => {
                    assert_eq!(c.field, field);
                    assert_eq!(c.cmp, cmp);
                    assert_eq!(c.value, value);
                }
                _ => panic!("expected Clause"),
            }
        }

        assert_clause(FilterExpr::eq("a", 1), "a", Cmp::Eq, Value::Int(1));
        assert_clause(FilterExpr::ne("a", 1), "a", Cmp::Ne, Value::Int(1));
        assert_clause(FilterExpr::lt("a", 1), "a", Cmp::Lt, Value::Int(1));
        assert_clause(FilterExpr::lte("a", 1), "a", Cmp::Lte, Value::Int(1));
        assert_clause(FilterExpr::gt("a", 1), "a", Cmp::Gt, Value::Int(1));
        assert_clause(FilterExpr::gte("a", 1), "a", Cmp::Gte, Value::Int(1));

        assert_clause(
            FilterExpr::contains("a", "Hello"),
            "a",
            Cmp::Contains,
            Value::Text("Hello".to_string()),
        );
        assert_clause(
            FilterExpr::starts_with("a", "He"),
            "a",
            Cmp::StartsWith,
            Value::Text("He".to_string()),
        );
        assert_clause(
            FilterExpr::ends_with("a", "lo"),
            "a",
            Cmp::EndsWith,
            Value::Text("lo".to_string()),
        );

        assert_clause(FilterExpr::is_null("a"), "a", Cmp::IsNull, Value::Unit);
        assert_clause(
            FilterExpr::is_not_null("a"),
            "a",
            Cmp::IsNotNull,
            Value::Unit,
        );

        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_clause(FilterExpr::in_iter("a", [1, 2]), "a", Cmp::In, list.clone());
        assert_clause(FilterExpr::not_in_iter("a", [1, 2]), "a", Cmp::NotIn, list);
    }

    #[test]
    fn simplify_and_true() {
        let expr = FilterExpr::And(vec![FilterExpr::True, clause("a")]);
        assert!(matches!(expr.simplify(), FilterExpr::Clause(_)));
    }

    #[test]
    fn simplify_and_false() {
        let expr = FilterExpr::And(vec![clause("a"), FilterExpr::False]);
        assert_eq!(expr.simplify(), FilterExpr::False);
    }

    #[test]
    fn double_negation() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::Not(Box::new(clause("x")))));
        assert!(matches!(expr.simplify(), FilterExpr::Clause(_)));
    }

    #[test]
    fn demorgan_not_and() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::And(vec![clause("a"), clause("b")])));
        let simplified = expr.simplify();
        if let FilterExpr::Or(children) = simplified {
            assert_eq!(children.len(), 2);
        } else {
            panic!("Expected Or");
        }
    }

    #[test]
    fn nested_and_flattens() {
        let expr = FilterExpr::And(vec![
            clause("a"),
            FilterExpr::And(vec![clause("b"), clause("c")]),
        ]);
        let simplified = expr.simplify();

        if let FilterExpr::And(children) = simplified {
            assert_eq!(children.len(), 3);
        } else {
            panic!("Expected And");
        }
    }

    #[test]
    fn ops_bitor_bitand_not() {
        let f = (clause("a") & clause("b")) | !clause("c");
        match f {
            FilterExpr::Or(children) => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    FilterExpr::And(left) => assert_eq!(left.len(), 2),
                    _ => panic!("left should be And"),
                }
                assert!(matches!(&children[1], FilterExpr::Not(_)));
            }
            _ => panic!("expected Or at root"),
        }
    }

    #[test]
    fn for_each_clause_visits_all_fields() {
        let expr = (clause("a") & clause("b")) | !clause("c");

        let mut fields = Vec::new();
        expr.for_each_clause(&mut |c| fields.push(c.field.clone()));
        fields.sort();

        assert_eq!(fields, vec!["a", "b", "c"]);
    }
}
