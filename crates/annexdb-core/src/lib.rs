//! Core runtime for annexdb: scalar values, entity traits, the
//! in-memory engine (store, query intents, load executor), and the
//! property-annotation layer, with the ergonomics exported via the
//! `prelude`.

pub mod annotate;
pub mod db;
pub mod traits;
pub mod types;
pub mod value;

// test scaffolding
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    AnnotateError(#[from] annotate::AnnotateError),

    #[error(transparent)]
    DbError(#[from] db::DbError),
}

impl From<db::query::QueryError> for Error {
    fn from(err: db::query::QueryError) -> Self {
        db::DbError::from(err).into()
    }
}

impl From<db::response::ResponseError> for Error {
    fn from(err: db::response::ResponseError) -> Self {
        db::DbError::from(err).into()
    }
}

impl From<db::store::StoreError> for Error {
    fn from(err: db::store::StoreError) -> Self {
        db::DbError::from(err).into()
    }
}

///
/// Prelude
///
/// Domain vocabulary only; executors and store internals stay behind
/// their modules.
///

pub mod prelude {
    pub use crate::{
        Error,
        annotate::{AnnotatableQuery, AnnotateError, KeyAtom, KeySpec, Manager},
        db::{
            Db,
            primitives::{CaseExpr, Cmp, FilterExpr, OrderDirection},
            query::LoadQuery,
            response::{Response, Row},
        },
        traits::{EntityIdentity, EntityValue, FieldValue, FieldValues, PropertyValues},
        types::Ulid,
        value::Value,
    };
}
