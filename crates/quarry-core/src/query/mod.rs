mod builder;
mod cache;
mod constraint;
mod criteria;
mod exec;

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorOrigin},
    path::PathError,
};
use thiserror::Error as ThisError;

// re-exports
pub use builder::{ExplainFn, Query};
pub use cache::QueryCache;
pub use constraint::{Constraint, Operand, Operator};
pub use criteria::{
    Action, ActionKind, CriteriaList, Criterion, CriterionKind, Order, OrderDirection, Relation,
    RelationDirection,
};
pub use exec::ExecError;

///
/// QueryError
/// Raised while building a query, at the step that was malformed.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("'{operator}' needs an active attribute; call where_attr first")]
    NoActiveAttribute { operator: String },
}

impl QueryError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Invalid
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Path(_) => ErrorOrigin::Path,
            Self::NoActiveAttribute { .. } => ErrorOrigin::Query,
        }
    }
}
