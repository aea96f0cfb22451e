use serde::{Deserialize, Serialize};

///
/// LimitExpr
/// Row window applied after filtering and ordering.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LimitExpr {
    pub offset: u32,
    pub limit: Option<u32>,
}

impl LimitExpr {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
