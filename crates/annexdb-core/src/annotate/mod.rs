//! Host-computed property annotation and sorting over lazy queries.
//!
//! The pipeline materializes a query, computes a value per row in the
//! host language, reinjects the values as a case expression keyed by
//! primary identifier, and re-wraps the result as a lazy query that
//! preserves the captured row order and stays fully chainable.

mod bridge;
mod facade;
mod key_spec;
mod pipeline;
mod resolver;

#[cfg(test)]
mod tests;

pub use facade::{AnnotatableQuery, Manager};
pub use key_spec::{BoxError, KeyAtom, KeySpec, PropertyFn};

use crate::value::Value;
use thiserror::Error as ThisError;

///
/// AnnotateError
///
/// Failures surface synchronously from the `annotate_property`/`sort`
/// call itself (the pipeline materializes eagerly) and never leave
/// partial results behind.
///

#[derive(Debug, ThisError)]
pub enum AnnotateError {
    #[error("key '{name}' does not resolve to a property or stored field (entity {entity})")]
    UnresolvableKey { entity: &'static str, name: String },

    #[error("computed key failed during evaluation (entity {entity})")]
    KeyEvaluation {
        entity: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error(
        "duplicate primary identifier {key} (entity {entity}); the mapped entity must guarantee unique identifiers"
    )]
    DuplicateIdentifier { entity: &'static str, key: Value },
}
