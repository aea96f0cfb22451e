use crate::{
    db::primitives::{CaseExpr, FilterExpr, LimitExpr, OrderDirection, OrderKey, OrderSpec},
    traits::{EntityIdentity, FieldValue},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// QueryError
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("unknown field '{field}' (entity {entity})")]
    UnknownField { entity: &'static str, field: String },

    #[error("annotation '{name}' shadows a stored field (entity {entity})")]
    AnnotationShadowsField { entity: &'static str, name: String },

    #[error("duplicate annotation '{name}' (entity {entity})")]
    DuplicateAnnotation { entity: &'static str, name: String },
}

///
/// Access
/// Row access path: the whole entity, or an explicit identifier set.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Access {
    #[default]
    All,
    Keys(Vec<Value>),
}

///
/// Annotation
/// A named expression attached to every returned row.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub expr: CaseExpr,
}

///
/// LoadQuery
///
/// Lazy query intent. Builders only record intent; nothing touches the
/// store until the intent is executed. The intent is plain serializable
/// data: callables never appear here, they are resolved eagerly by the
/// annotation pipeline before an intent is built.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LoadQuery {
    pub access: Access,
    pub filter: Option<FilterExpr>,
    pub annotations: Vec<Annotation>,
    pub order: Option<OrderSpec>,
    pub window: Option<LimitExpr>,
}

impl LoadQuery {
    /// Construct an empty load query (reads all rows).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// CONSTRUCTORS
    ///

    /// Restrict the access path to an explicit identifier set.
    #[must_use]
    pub fn keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: FieldValue,
    {
        self.access = Access::Keys(keys.into_iter().map(FieldValue::to_value).collect());
        self
    }

    ///
    /// Refinement
    ///

    /// And-compose a filter expression onto the query.
    #[must_use]
    pub fn filter(mut self, expr: FilterExpr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(expr),
            None => expr,
        });

        self
    }

    /// And-compose the negation of a filter expression.
    #[must_use]
    pub fn exclude(self, expr: FilterExpr) -> Self {
        self.filter(expr.not())
    }

    /// Attach a named annotation expression.
    #[must_use]
    pub fn annotate(mut self, name: impl Into<String>, expr: CaseExpr) -> Self {
        self.annotations.push(Annotation {
            name: name.into(),
            expr,
        });

        self
    }

    /// Append an ascending sort key on a field or annotation name.
    #[must_use]
    pub fn order_by(self, field: impl Into<String>) -> Self {
        self.order_key(OrderKey::Field(field.into()), OrderDirection::Asc)
    }

    /// Append a descending sort key on a field or annotation name.
    #[must_use]
    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_key(OrderKey::Field(field.into()), OrderDirection::Desc)
    }

    fn order_key(mut self, key: OrderKey, direction: OrderDirection) -> Self {
        self.order
            .get_or_insert_with(OrderSpec::default)
            .keys
            .push((key, direction));

        self
    }

    /// Replace any ordering with an explicit order spec.
    #[must_use]
    pub fn ordered(mut self, order: OrderSpec) -> Self {
        self.order = Some(order);
        self
    }

    /// Bound the number of returned rows.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.window = Some(self.window.unwrap_or_default().limit(limit));
        self
    }

    /// Skip a number of rows in the ordered result stream.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.window = Some(self.window.unwrap_or_default().offset(offset));
        self
    }

    ///
    /// Validation
    ///

    /// Check every referenced field name against the entity's registry:
    /// filter and order keys may name stored fields or attached
    /// annotations; case-expression probes may only name stored fields.
    pub fn validate<E: EntityIdentity>(&self) -> Result<(), QueryError> {
        let mut annotation_names = BTreeSet::new();

        for annotation in &self.annotations {
            if E::FIELDS.contains(&annotation.name.as_str()) {
                return Err(QueryError::AnnotationShadowsField {
                    entity: E::ENTITY_NAME,
                    name: annotation.name.clone(),
                });
            }
            if !annotation_names.insert(annotation.name.as_str()) {
                return Err(QueryError::DuplicateAnnotation {
                    entity: E::ENTITY_NAME,
                    name: annotation.name.clone(),
                });
            }

            Self::validate_probe::<E>(&annotation.expr)?;
        }

        if let Some(filter) = &self.filter {
            let mut result = Ok(());
            filter.for_each_clause(&mut |clause| {
                if result.is_ok() {
                    result = Self::validate_name::<E>(&clause.field, &annotation_names);
                }
            });
            result?;
        }

        if let Some(order) = &self.order {
            for (key, _) in &order.keys {
                match key {
                    OrderKey::Field(field) => {
                        Self::validate_name::<E>(field, &annotation_names)?;
                    }
                    OrderKey::Expr(expr) => Self::validate_probe::<E>(expr)?,
                }
            }
        }

        Ok(())
    }

    fn validate_name<E: EntityIdentity>(
        field: &str,
        annotations: &BTreeSet<&str>,
    ) -> Result<(), QueryError> {
        if E::FIELDS.contains(&field) || annotations.contains(field) {
            Ok(())
        } else {
            Err(QueryError::UnknownField {
                entity: E::ENTITY_NAME,
                field: field.to_string(),
            })
        }
    }

    fn validate_probe<E: EntityIdentity>(expr: &CaseExpr) -> Result<(), QueryError> {
        if E::FIELDS.contains(&expr.field.as_str()) {
            Ok(())
        } else {
            Err(QueryError::UnknownField {
                entity: E::ENTITY_NAME,
                field: expr.field.clone(),
            })
        }
    }
}
