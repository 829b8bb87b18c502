use crate::{
    path::PathRef,
    validate::ValidatorRegistry,
    value::{Value, ValueTag},
};
use serde::{Serialize, Serializer};
use std::fmt;

///
/// Operator
///
/// Comparison name carried by a constraint. Adapters and the validator
/// registry look operators up by [`Operator::name`].
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    Eq,
    Neq,
    Gte,
    Gt,
    Lte,
    Lt,
    In,
    Nin,
    Match,
    Custom(String),
}

impl Operator {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gte => "gte",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Lt => "lt",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Match => "match",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        match name {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gte" => Self::Gte,
            "gt" => Self::Gt,
            "lte" => Self::Lte,
            "lt" => Self::Lt,
            "in" | "contains" => Self::In,
            "nin" | "excludes" => Self::Nin,
            "match" => Self::Match,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

///
/// Operand
/// Right-hand literal plus its runtime tag.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Operand {
    pub value: Value,
    #[serde(rename = "type")]
    pub tag: ValueTag,
}

impl Operand {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let tag = value.tag();

        Self { value, tag }
    }
}

///
/// Constraint
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Constraint {
    pub left: PathRef,
    pub operator: Operator,
    pub right: Operand,
}

impl Constraint {
    #[must_use]
    pub fn new(left: PathRef, operator: impl Into<Operator>, right: impl Into<Value>) -> Self {
        Self {
            left,
            operator: operator.into(),
            right: Operand::new(right),
        }
    }

    /// Evaluate against an actual attribute value using the registry's
    /// predicate for this operator. `None` when the operator is unknown.
    #[must_use]
    pub fn test(&self, registry: &ValidatorRegistry, actual: &Value) -> Option<bool> {
        let predicate = registry.lookup(self.operator.name())?;

        Some(predicate(actual, &self.right.value))
    }
}
