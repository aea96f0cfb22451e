//! Materialize-compute-reinject pipeline.
//!
//! Each call is one self-contained blocking pass: evaluate the input
//! query, resolve the key specification per row, then reissue a lazy
//! query filtered to exactly the materialized identifier set with an
//! explicit position-based ordering. The engine's natural ordering of
//! the reissued query is never trusted.
//!
//! Consistency caveat: the two engine round-trips (materialize, then
//! evaluate the reissued query) are not isolated against concurrent
//! writes; a row changed in between is reflected in its stored fields
//! but not in the already-computed annotation values.

use crate::{
    Error,
    annotate::{AnnotateError, KeySpec, bridge, resolver},
    db::{
        Db,
        executor::LoadExecutor,
        primitives::{CaseExpr, OrderDirection, OrderSpec},
        query::LoadQuery,
        response::Response,
    },
    traits::{EntityValue, FieldValue},
    value::{CanonicalKey, Value, canonical_cmp},
};
use std::collections::BTreeSet;

/// Annotate every row of `query` with the resolved key under
/// `output_name`, preserving the query's evaluated row order exactly.
pub(crate) fn annotate<E: EntityValue>(
    db: &Db,
    query: &LoadQuery,
    spec: &KeySpec<E>,
    output_name: &str,
    debug: bool,
) -> Result<LoadQuery, Error> {
    resolver::validate_spec(spec)?;

    let rows = LoadExecutor::<E>::new(db).debug(debug).execute(query)?;

    let binding = resolve_binding(&rows, spec)?;
    let ordered: Vec<Value> = binding.iter().map(|(key, _)| key.clone()).collect();

    let bridge = bridge::case_over_keys(E::PRIMARY_KEY, binding);
    let position = bridge::position_order(E::PRIMARY_KEY, &ordered);

    Ok(reinjected(query, ordered, position).annotate(output_name, bridge))
}

/// Sort the rows of `query` by the resolved key (stable, host ordering
/// semantics) and reissue a lazy query reproducing that order.
pub(crate) fn sort<E: EntityValue>(
    db: &Db,
    query: &LoadQuery,
    spec: &KeySpec<E>,
    direction: OrderDirection,
    debug: bool,
) -> Result<LoadQuery, Error> {
    resolver::validate_spec(spec)?;

    let rows = LoadExecutor::<E>::new(db).debug(debug).execute(query)?;

    let mut decorated = resolve_binding(&rows, spec)?;

    // Stable sort: rows with equal keys keep their materialized order.
    decorated.sort_by(|(_, left), (_, right)| {
        let cmp = canonical_cmp(left, right);
        match direction {
            OrderDirection::Asc => cmp,
            OrderDirection::Desc => cmp.reverse(),
        }
    });

    let ordered: Vec<Value> = decorated.into_iter().map(|(key, _)| key).collect();
    let position = bridge::position_order(E::PRIMARY_KEY, &ordered);

    Ok(reinjected(query, ordered, position))
}

// Resolve the key spec over the materialized rows, producing ordered
// (identifier, value) pairs. The first resolution failure discards the
// whole binding; duplicate identifiers are a schema-level fatal.
fn resolve_binding<E: EntityValue>(
    rows: &Response<E>,
    spec: &KeySpec<E>,
) -> Result<Vec<(Value, Value)>, Error> {
    let mut seen = BTreeSet::new();
    let mut binding = Vec::with_capacity(rows.rows().len());

    for row in rows.iter() {
        let key = row.key.to_value();
        if !seen.insert(CanonicalKey(key.clone())) {
            return Err(AnnotateError::DuplicateIdentifier {
                entity: E::ENTITY_NAME,
                key,
            }
            .into());
        }

        let value = resolver::resolve(&row.entity, spec)?;
        binding.push((key, value));
    }

    Ok(binding)
}

// Reissue against the same base entity: access exactly the captured
// identifiers, carry existing annotation expressions forward (repeated
// annotation accumulates), impose the explicit position order. The
// input query's filter and window are already reflected in the
// identifier set and are not carried.
fn reinjected(base: &LoadQuery, ordered: Vec<Value>, position: CaseExpr) -> LoadQuery {
    let mut query = LoadQuery::new()
        .keys(ordered)
        .ordered(OrderSpec::by_expr(position));
    query.annotations = base.annotations.clone();

    query
}
