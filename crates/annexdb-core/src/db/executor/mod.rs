mod eval;

#[cfg(test)]
mod tests;

pub(crate) use eval::row_value;

use crate::{
    db::{
        Db, DbError,
        primitives::{CaseExpr, OrderDirection, OrderKey, OrderSpec},
        query::{Access, LoadQuery},
        response::{Response, Row},
    },
    traits::{EntityValue, FieldValue, FieldValues},
    value::{CanonicalKey, Value, canonical_cmp},
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    marker::PhantomData,
};

///
/// CaseProgram
/// Compiled form of a `CaseExpr`: first-match-wins arms lowered into a
/// canonical lookup table, built once per execution.
///

struct CaseProgram {
    field: String,
    table: BTreeMap<CanonicalKey, Value>,
}

impl CaseProgram {
    fn compile(expr: &CaseExpr) -> Self {
        let mut table = BTreeMap::new();
        for arm in &expr.arms {
            // first matching arm wins
            table
                .entry(CanonicalKey(arm.when.clone()))
                .or_insert_with(|| arm.then.clone());
        }

        Self {
            field: expr.field.clone(),
            table,
        }
    }

    fn eval<E: EntityValue>(&self, entity: &E) -> Value {
        let probe = entity.field_value(&self.field).unwrap_or(Value::Null);

        self.table
            .get(&CanonicalKey(probe))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

enum OrderProgram {
    Field(String),
    Expr(CaseProgram),
}

///
/// LoadExecutor
///
/// Executes a `LoadQuery` intent against the store: scan, access
/// restriction, annotation evaluation, filtering, stable ordering,
/// then windowing.
///

pub struct LoadExecutor<'a, E: EntityValue> {
    db: &'a Db,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<'a, E: EntityValue> LoadExecutor<'a, E> {
    #[must_use]
    pub const fn new(db: &'a Db) -> Self {
        Self {
            db,
            debug: false,
            _marker: PhantomData,
        }
    }

    /// Enable verbose execution summaries.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.debug {
            println!("[debug] {}", s.as_ref());
        }
    }

    pub fn execute(&self, query: &LoadQuery) -> Result<Response<E>, DbError> {
        query.validate::<E>()?;

        let scanned = self.db.scan::<E>()?;
        let rows_scanned = scanned.len();

        let keyset: Option<BTreeSet<CanonicalKey>> = match &query.access {
            Access::All => None,
            Access::Keys(keys) => Some(keys.iter().cloned().map(CanonicalKey).collect()),
        };

        let programs: Vec<(String, CaseProgram)> = query
            .annotations
            .iter()
            .map(|annotation| (annotation.name.clone(), CaseProgram::compile(&annotation.expr)))
            .collect();

        let mut rows: Vec<Row<E>> = Vec::new();
        for (key, entity) in scanned {
            if let Some(keyset) = &keyset {
                if !keyset.contains(&CanonicalKey(key.to_value())) {
                    continue;
                }
            }

            let annotations = programs
                .iter()
                .map(|(name, program)| (name.clone(), program.eval(&entity)))
                .collect();

            let row = Row {
                key,
                entity,
                annotations,
            };

            if let Some(filter) = &query.filter {
                if !eval::filter_matches(&row, filter) {
                    continue;
                }
            }

            rows.push(row);
        }
        let rows_matched = rows.len();

        if let Some(order) = &query.order {
            if !order.is_empty() {
                apply_order(&mut rows, order);
            }
        }

        if let Some(window) = query.window {
            let limit = window.limit.map_or(usize::MAX, |limit| limit as usize);
            rows = rows
                .into_iter()
                .skip(window.offset as usize)
                .take(limit)
                .collect();
        }

        self.debug_log(format!(
            "load {}: scanned={rows_scanned} matched={rows_matched} returned={}",
            E::ENTITY_NAME,
            rows.len()
        ));

        Ok(Response(rows))
    }
}

// Stable sort: rows with equal keys keep their incoming relative order.
fn apply_order<E: EntityValue>(rows: &mut Vec<Row<E>>, order: &OrderSpec) {
    let programs: Vec<(OrderProgram, OrderDirection)> = order
        .keys
        .iter()
        .map(|(key, direction)| {
            let program = match key {
                OrderKey::Field(field) => OrderProgram::Field(field.clone()),
                OrderKey::Expr(expr) => OrderProgram::Expr(CaseProgram::compile(expr)),
            };
            (program, *direction)
        })
        .collect();

    let mut decorated: Vec<(Vec<Value>, Row<E>)> = rows
        .drain(..)
        .map(|row| {
            let keys = programs
                .iter()
                .map(|(program, _)| match program {
                    OrderProgram::Field(field) => row_value(&row, field),
                    OrderProgram::Expr(case) => case.eval(&row.entity),
                })
                .collect();

            (keys, row)
        })
        .collect();

    decorated.sort_by(|(left, _), (right, _)| {
        for ((a, b), (_, direction)) in left.iter().zip(right.iter()).zip(&programs) {
            let mut cmp = canonical_cmp(a, b);
            if *direction == OrderDirection::Desc {
                cmp = cmp.reverse();
            }
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        Ordering::Equal
    });

    rows.extend(decorated.into_iter().map(|(_, row)| row));
}
