//! Test scaffolding: fixture entities and seed helpers.
//! Compiled for tests (and the `test-support` feature); not used at runtime.

use crate::{
    db::Db,
    traits::{EntityIdentity, EntityValue, FieldValue, FieldValues, PropertyValues},
    types::Ulid,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Product
///
/// Canonical fixture entity: four stored fields plus two host-computed
/// properties (`name_length`, `margin`).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Product {
    pub id: Ulid,
    pub name: String,
    pub price: i64,
    pub cost: i64,
}

impl Product {
    /// Deterministic fixture row keyed by a raw u128.
    #[must_use]
    pub fn fixture(raw: u128, name: &str, price: i64, cost: i64) -> Self {
        Self {
            id: Ulid::from_u128(raw),
            name: name.to_string(),
            price,
            cost,
        }
    }

    /// Computed: characters in the product name.
    #[must_use]
    pub fn name_length(&self) -> usize {
        self.name.chars().count()
    }

    /// Computed: cost as a fraction of price.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn margin(&self) -> f64 {
        self.cost as f64 / self.price as f64
    }
}

impl EntityIdentity for Product {
    type Key = Ulid;

    const ENTITY_NAME: &'static str = "Product";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: &'static [&'static str] = &["id", "name", "price", "cost"];
    const PROPERTIES: &'static [&'static str] = &["margin", "name_length"];
}

impl FieldValues for Product {
    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.clone().to_value()),
            "price" => Some(self.price.to_value()),
            "cost" => Some(self.cost.to_value()),
            _ => None,
        }
    }
}

impl PropertyValues for Product {
    fn property_value(&self, name: &str) -> Option<Value> {
        match name {
            "margin" => Some(self.margin().to_value()),
            "name_length" => Some(self.name_length().to_value()),
            _ => None,
        }
    }
}

impl EntityValue for Product {
    fn key(&self) -> Ulid {
        self.id
    }
}

/// Fresh `Db` with `Product` registered and the given rows inserted.
#[must_use]
pub fn db_with(products: &[Product]) -> Db {
    let db = Db::new();
    db.register::<Product>();

    for product in products {
        db.insert(product).expect("fixture insert");
    }

    db
}

/// The standard three-row catalog used across annotation tests:
/// name lengths 3 ("Amy"), 3 ("Bob"), 5 ("Carla").
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        Product::fixture(1, "Bob", 100, 40),
        Product::fixture(2, "Amy", 200, 160),
        Product::fixture(3, "Carla", 300, 60),
    ]
}
