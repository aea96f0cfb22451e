use crate::{traits::EntityValue, value::Value};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ResponseError
/// Errors related to interpreting a materialized response.
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("expected exactly one row, found 0 (entity {entity})")]
    NotFound { entity: &'static str },

    #[error("expected exactly one row, found {count} (entity {entity})")]
    NotUnique { entity: &'static str, count: u32 },
}

///
/// Row
/// One materialized row: primary key, decoded entity, and the values of
/// any annotations the query attached.
///

#[derive(Clone, Debug)]
pub struct Row<E: EntityValue> {
    pub key: E::Key,
    pub entity: E,
    pub annotations: BTreeMap<String, Value>,
}

impl<E: EntityValue> Row<E> {
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Value> {
        self.annotations.get(name)
    }
}

///
/// Response
/// Materialized query result: ordered rows.
///

#[derive(Debug)]
pub struct Response<E: EntityValue>(pub Vec<Row<E>>);

impl<E: EntityValue> Response<E> {
    //
    // Cardinality
    //

    #[must_use]
    /// Number of rows in the response, truncated to `u32`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn count(&self) -> u32 {
        self.0.len() as u32
    }

    #[must_use]
    /// True when no rows were returned.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Require exactly one row.
    pub fn one(self) -> Result<Row<E>, ResponseError> {
        let count = self.count();

        match count {
            0 => Err(ResponseError::NotFound {
                entity: E::ENTITY_NAME,
            }),
            1 => Ok(self.0.into_iter().next().unwrap()),
            _ => Err(ResponseError::NotUnique {
                entity: E::ENTITY_NAME,
                count,
            }),
        }
    }

    /// Require exactly one entity.
    pub fn one_entity(self) -> Result<E, ResponseError> {
        self.one().map(|row| row.entity)
    }

    //
    // Keys
    //

    #[must_use]
    /// Collect all primary keys in order.
    pub fn keys(&self) -> Vec<E::Key> {
        self.0.iter().map(|row| row.key).collect()
    }

    //
    // Rows / entities
    //

    #[must_use]
    pub fn rows(&self) -> &[Row<E>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row<E>> {
        self.0.iter()
    }

    #[must_use]
    /// Consume the response and return the first entity, if any.
    pub fn entity(self) -> Option<E> {
        self.0.into_iter().next().map(|row| row.entity)
    }

    #[must_use]
    /// Consume the response and collect all entities.
    pub fn entities(self) -> Vec<E> {
        self.0.into_iter().map(|row| row.entity).collect()
    }

    //
    // Annotations
    //

    #[must_use]
    /// Collect one annotation's values in row order (`Null` when a row
    /// does not carry it).
    pub fn annotation_values(&self, name: &str) -> Vec<Value> {
        self.0
            .iter()
            .map(|row| row.annotation(name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

impl<E: EntityValue> IntoIterator for Response<E> {
    type Item = Row<E>;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
