mod codec;

pub(crate) use codec::{decode_row, encode_row};

use crate::traits::EntityIdentity;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("entity '{0}' is not registered")]
    EntityNotRegistered(&'static str),

    #[error("entity '{0}' is registered with a different row type")]
    StoreTypeMismatch(&'static str),

    #[error("duplicate primary key {key} (entity {entity})")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("failed to encode row (entity {entity}): {message}")]
    EncodeFailed { entity: &'static str, message: String },

    #[error("corrupt row (entity {entity}): {message}")]
    Corrupt { entity: &'static str, message: String },
}

///
/// EntityRows
///
/// Serialized rows of one entity, keyed by primary key.
/// Scan order is key order, which is the engine's natural row order.
///

#[derive(Debug)]
pub struct EntityRows<E: EntityIdentity> {
    rows: BTreeMap<E::Key, Vec<u8>>,
}

impl<E: EntityIdentity> EntityRows<E> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &E::Key) -> bool {
        self.rows.contains_key(key)
    }

    pub(crate) fn insert(&mut self, key: E::Key, bytes: Vec<u8>) -> Result<(), StoreError> {
        if self.rows.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                entity: E::ENTITY_NAME,
                key: format!("{key:?}"),
            });
        }

        self.rows.insert(key, bytes);

        Ok(())
    }

    pub(crate) fn replace(&mut self, key: E::Key, bytes: Vec<u8>) {
        self.rows.insert(key, bytes);
    }

    pub(crate) fn remove(&mut self, key: &E::Key) -> bool {
        self.rows.remove(key).is_some()
    }

    /// Iterate serialized rows in key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&E::Key, &Vec<u8>)> {
        self.rows.iter()
    }
}

impl<E: EntityIdentity> Default for EntityRows<E> {
    fn default() -> Self {
        Self::new()
    }
}
