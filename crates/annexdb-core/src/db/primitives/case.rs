use crate::{traits::FieldValue, value::Value};
use serde::{Deserialize, Serialize};

///
/// CaseExpr
///
/// Single conditional expression over one probe field: for each arm,
/// `WHEN probe == when THEN then`. The first matching arm wins; a probe
/// value matching no arm yields `Null`.
///
/// This is the engine's lookup-table construct: a binding of
/// identifier -> value becomes one `CaseExpr` over the identifier
/// field, composable wherever a field-like value is accepted
/// (annotations, filters via the annotation name, ordering).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CaseExpr {
    pub field: String,
    pub arms: Vec<CaseArm>,
}

///
/// CaseArm
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CaseArm {
    pub when: Value,
    pub then: Value,
}

impl CaseExpr {
    /// An armless expression over `field`; evaluates to `Null` for every row.
    #[must_use]
    pub fn over(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            arms: Vec::new(),
        }
    }

    /// Append a `WHEN when THEN then` arm.
    #[must_use]
    pub fn when(mut self, when: impl FieldValue, then: impl FieldValue) -> Self {
        self.arms.push(CaseArm {
            when: when.to_value(),
            then: then.to_value(),
        });

        self
    }

    /// Build an expression from `(when, then)` pairs, preserving order.
    pub fn from_pairs(
        field: impl Into<String>,
        pairs: impl IntoIterator<Item = (Value, Value)>,
    ) -> Self {
        Self {
            field: field.into(),
            arms: pairs
                .into_iter()
                .map(|(when, then)| CaseArm { when, then })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Evaluate against a probe value: first matching arm wins, `Null`
    /// when nothing matches.
    #[must_use]
    pub fn eval(&self, probe: &Value) -> Value {
        self.arms
            .iter()
            .find(|arm| arm.when == *probe)
            .map_or(Value::Null, |arm| arm.then.clone())
    }
}
