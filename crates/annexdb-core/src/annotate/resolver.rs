//! Value resolution: apply a key specification to one record.
//!
//! Pure; never mutates the record. The first failing resolution aborts
//! the caller's whole pass (no skip-and-continue), including inside
//! composites.

use crate::{
    annotate::{AnnotateError, KeyAtom, KeySpec, PropertyFn},
    traits::{EntityValue, FieldValues, PropertyValues},
    value::Value,
};

/// Check every name in the key specification against the entity's
/// registries before any row is touched, so an unresolvable name fails
/// fast even for an empty working set. Callables can only be judged
/// per record.
pub(crate) fn validate_spec<E: EntityValue>(spec: &KeySpec<E>) -> Result<(), AnnotateError> {
    match spec {
        KeySpec::Name(name) => validate_name::<E>(name),
        KeySpec::Call(_) => Ok(()),
        KeySpec::Composite(atoms) => atoms.iter().try_for_each(|atom| match atom {
            KeyAtom::Name(name) => validate_name::<E>(name),
            KeyAtom::Call(_) => Ok(()),
        }),
    }
}

fn validate_name<E: EntityValue>(name: &str) -> Result<(), AnnotateError> {
    if E::PROPERTIES.contains(&name) || E::FIELDS.contains(&name) {
        Ok(())
    } else {
        Err(AnnotateError::UnresolvableKey {
            entity: E::ENTITY_NAME,
            name: name.to_string(),
        })
    }
}

pub(crate) fn resolve<E: EntityValue>(
    entity: &E,
    spec: &KeySpec<E>,
) -> Result<Value, AnnotateError> {
    match spec {
        KeySpec::Name(name) => resolve_name(entity, name),
        KeySpec::Call(f) => invoke(entity, f),
        KeySpec::Composite(atoms) => atoms
            .iter()
            .map(|atom| match atom {
                KeyAtom::Name(name) => resolve_name(entity, name),
                KeyAtom::Call(f) => invoke(entity, f),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}

// Properties take precedence; a name in neither registry is unresolvable.
fn resolve_name<E: EntityValue>(entity: &E, name: &str) -> Result<Value, AnnotateError> {
    entity
        .property_value(name)
        .or_else(|| entity.field_value(name))
        .ok_or_else(|| AnnotateError::UnresolvableKey {
            entity: E::ENTITY_NAME,
            name: name.to_string(),
        })
}

fn invoke<E: EntityValue>(entity: &E, f: &PropertyFn<E>) -> Result<Value, AnnotateError> {
    f(entity).map_err(|source| AnnotateError::KeyEvaluation {
        entity: E::ENTITY_NAME,
        source,
    })
}
