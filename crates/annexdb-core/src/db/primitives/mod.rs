mod case;
mod filter;
mod limit;
mod sort;

pub use case::{CaseArm, CaseExpr};
pub use filter::{Cmp, FilterClause, FilterExpr};
pub use limit::LimitExpr;
pub use sort::{OrderDirection, OrderKey, OrderSpec};
