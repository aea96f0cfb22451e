pub mod executor;
pub mod primitives;
pub mod query;
pub mod response;
pub mod store;

use crate::{
    db::{
        query::QueryError,
        response::ResponseError,
        store::{EntityRows, StoreError, decode_row, encode_row},
    },
    traits::{EntityIdentity, EntityValue},
};
use std::{any::Any, cell::RefCell, collections::BTreeMap};
use thiserror::Error as ThisError;

///
/// DbError
///

#[derive(Debug, ThisError)]
pub enum DbError {
    #[error(transparent)]
    QueryError(#[from] QueryError),

    #[error(transparent)]
    ResponseError(#[from] ResponseError),

    #[error(transparent)]
    StoreError(#[from] StoreError),
}

///
/// Db
///
/// A handle to the set of entity stores registered for one database.
///
/// Entities opt in at registration time via `register::<E>()`; queries,
/// writes, and the annotation facade all route through this handle.
/// Single-threaded by construction (interior `RefCell` state).
///

#[derive(Default)]
pub struct Db {
    stores: RefCell<BTreeMap<&'static str, Box<dyn Any>>>,
}

impl Db {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity's store. Idempotent.
    pub fn register<E: EntityIdentity + 'static>(&self) {
        self.stores
            .borrow_mut()
            .entry(E::ENTITY_NAME)
            .or_insert_with(|| Box::new(RefCell::new(EntityRows::<E>::new())));
    }

    /// Run a closure with read access to an entity's rows.
    pub fn with_rows<E: EntityIdentity + 'static, R>(
        &self,
        f: impl FnOnce(&EntityRows<E>) -> R,
    ) -> Result<R, StoreError> {
        let stores = self.stores.borrow();
        let cell = Self::rows_cell::<E>(&stores)?;

        Ok(f(&cell.borrow()))
    }

    /// Run a closure with write access to an entity's rows.
    pub fn with_rows_mut<E: EntityIdentity + 'static, R>(
        &self,
        f: impl FnOnce(&mut EntityRows<E>) -> R,
    ) -> Result<R, StoreError> {
        let stores = self.stores.borrow();
        let cell = Self::rows_cell::<E>(&stores)?;

        Ok(f(&mut cell.borrow_mut()))
    }

    fn rows_cell<'a, E: EntityIdentity + 'static>(
        stores: &'a BTreeMap<&'static str, Box<dyn Any>>,
    ) -> Result<&'a RefCell<EntityRows<E>>, StoreError> {
        let any = stores
            .get(E::ENTITY_NAME)
            .ok_or(StoreError::EntityNotRegistered(E::ENTITY_NAME))?;

        any.downcast_ref::<RefCell<EntityRows<E>>>()
            .ok_or(StoreError::StoreTypeMismatch(E::ENTITY_NAME))
    }

    //
    // Writes
    //

    /// Insert a new row; a row with the same primary key is an error.
    pub fn insert<E: EntityValue>(&self, entity: &E) -> Result<(), StoreError> {
        let bytes = encode_row(entity)?;

        self.with_rows_mut::<E, _>(|rows| rows.insert(entity.key(), bytes))?
    }

    /// Insert or overwrite a row.
    pub fn replace<E: EntityValue>(&self, entity: &E) -> Result<(), StoreError> {
        let bytes = encode_row(entity)?;

        self.with_rows_mut::<E, _>(|rows| rows.replace(entity.key(), bytes))?;

        Ok(())
    }

    /// Delete a row by primary key; returns whether a row was removed.
    pub fn delete<E: EntityValue>(&self, key: &E::Key) -> Result<bool, StoreError> {
        self.with_rows_mut::<E, _>(|rows| rows.remove(key))
    }

    //
    // Reads
    //

    /// Materialize every row of an entity in key order.
    pub fn scan<E: EntityValue>(&self) -> Result<Vec<(E::Key, E)>, StoreError> {
        self.with_rows::<E, _>(|rows| {
            rows.iter()
                .map(|(key, bytes)| decode_row::<E>(bytes).map(|entity| (*key, entity)))
                .collect()
        })?
    }

    /// Number of stored rows for an entity.
    pub fn len<E: EntityIdentity + 'static>(&self) -> Result<usize, StoreError> {
        self.with_rows::<E, _>(EntityRows::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Product;

    #[test]
    fn unregistered_entity_is_an_error() {
        let db = Db::new();
        let err = db.scan::<Product>().unwrap_err();

        assert!(matches!(err, StoreError::EntityNotRegistered("Product")));
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let db = Db::new();
        db.register::<Product>();

        let product = Product::fixture(1, "Amy", 100, 50);
        db.insert(&product).unwrap();

        let err = db.insert(&product).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { entity: "Product", .. }));
    }

    #[test]
    fn scan_returns_rows_in_key_order() {
        let db = Db::new();
        db.register::<Product>();

        for raw in [3u128, 1, 2] {
            db.insert(&Product::fixture(raw, "p", 1, 1)).unwrap();
        }

        let keys: Vec<u128> = db
            .scan::<Product>()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key.to_u128())
            .collect();

        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn replace_overwrites_and_delete_removes() {
        let db = Db::new();
        db.register::<Product>();

        let mut product = Product::fixture(1, "Amy", 100, 50);
        db.insert(&product).unwrap();

        product.price = 200;
        db.replace(&product).unwrap();

        let (_, stored) = db.scan::<Product>().unwrap().remove(0);
        assert_eq!(stored.price, 200);

        assert!(db.delete::<Product>(&product.id).unwrap());
        assert!(!db.delete::<Product>(&product.id).unwrap());
    }
}
