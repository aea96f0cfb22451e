//! annexdb: host-computed property annotation and sorting for a typed
//! query engine.
//!
//! Arbitrary computed values (entity properties or host callables) can
//! be annotated onto result sets, filtered on, and used as sort keys,
//! as if they were engine-computed columns. The facade stays fully
//! chainable: every refinement returns another annotation-capable
//! query.
//!
//! ## Crate layout
//! - `core`: runtime data model, engine, and the annotation pipeline.
//!
//! The `prelude` module mirrors the runtime surface used by callers.

pub use annexdb_core as core;

pub use annexdb_core::Error;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use annexdb_core::prelude::*;
}
