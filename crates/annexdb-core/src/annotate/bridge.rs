//! Ephemeral store bridge: expose an identifier -> value binding to the
//! engine as a case expression over the identifier field.

use crate::{db::primitives::CaseExpr, traits::FieldValue, value::Value};

/// Build the lookup-table expression for a computed binding.
///
/// An empty binding is allowed and produces the armless expression,
/// which evaluates to `Null` for every row (the no-op choice; there is
/// no empty-binding error).
pub(crate) fn case_over_keys(
    identifier_field: &str,
    binding: Vec<(Value, Value)>,
) -> CaseExpr {
    CaseExpr::from_pairs(identifier_field, binding)
}

/// Build the ordering expression mapping each identifier to its ordinal
/// position, used to impose a captured row order on a reissued query.
pub(crate) fn position_order(identifier_field: &str, keys: &[Value]) -> CaseExpr {
    CaseExpr::from_pairs(
        identifier_field,
        keys.iter()
            .enumerate()
            .map(|(position, key)| (key.clone(), position.to_value())),
    )
}
