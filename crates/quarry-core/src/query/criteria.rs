use crate::{
    path::{ModelRef, PathRef},
    query::constraint::Constraint,
    value::Value,
};
use derive_more::Deref;
use serde::{Serialize, Serializer, ser::SerializeTuple};
use std::{fmt, sync::Arc};
use tracing::trace;

///
/// CriterionKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CriterionKind {
    Start,
    Select,
    Relation,
    Constraint,
    Order,
    Action,
    Limit,
    As,
    Return,
}

impl CriterionKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Select => "select",
            Self::Relation => "relation",
            Self::Constraint => "constraint",
            Self::Order => "order",
            Self::Action => "action",
            Self::Limit => "limit",
            Self::As => "as",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// RelationDirection
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationDirection {
    Incoming,
    Outgoing,
}

///
/// Relation
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Relation {
    #[serde(flatten)]
    pub path: PathRef,
    pub direction: RelationDirection,
}

///
/// OrderDirection
/// Serialized as the sort sign: `1` ascending, `-1` descending.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl Serialize for OrderDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

///
/// Order
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Order {
    #[serde(flatten)]
    pub path: PathRef,
    pub direction: OrderDirection,
}

///
/// ActionKind
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ActionKind {
    Find,
    Remove,
    Pipe,
    Stream,
    Count,
    Exists,
    Create,
    Update,
    Custom(String),
}

impl ActionKind {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Find => "find",
            Self::Remove => "remove",
            Self::Pipe => "pipe",
            Self::Stream => "stream",
            Self::Count => "count",
            Self::Exists => "exists",
            Self::Create => "create",
            Self::Update => "update",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ActionKind {
    fn from(label: &str) -> Self {
        match label {
            "find" => Self::Find,
            "remove" => Self::Remove,
            "pipe" => Self::Pipe,
            "stream" => Self::Stream,
            "count" => Self::Count,
            "exists" => Self::Exists,
            "create" => Self::Create,
            "update" => Self::Update,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

///
/// Action
///
/// `data` is always a list when present; a single record is wrapped.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
}

impl Action {
    #[must_use]
    pub fn new(kind: impl Into<ActionKind>, data: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            data: data.map(Value::into_list),
        }
    }
}

///
/// Criterion
///
/// One `[kind, payload]` entry of a query.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Criterion {
    Start(ModelRef),
    Select(PathRef),
    Relation(Relation),
    Constraint(Constraint),
    Order(Order),
    Action(Action),
    Limit(u32),
    As(String),
    Return(String),
}

impl Criterion {
    #[must_use]
    pub const fn kind(&self) -> CriterionKind {
        match self {
            Self::Start(_) => CriterionKind::Start,
            Self::Select(_) => CriterionKind::Select,
            Self::Relation(_) => CriterionKind::Relation,
            Self::Constraint(_) => CriterionKind::Constraint,
            Self::Order(_) => CriterionKind::Order,
            Self::Action(_) => CriterionKind::Action,
            Self::Limit(_) => CriterionKind::Limit,
            Self::As(_) => CriterionKind::As,
            Self::Return(_) => CriterionKind::Return,
        }
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.kind().label())?;

        match self {
            Self::Start(model) => tuple.serialize_element(model)?,
            Self::Select(path) => tuple.serialize_element(path)?,
            Self::Relation(relation) => tuple.serialize_element(relation)?,
            Self::Constraint(constraint) => tuple.serialize_element(constraint)?,
            Self::Order(order) => tuple.serialize_element(order)?,
            Self::Action(action) => tuple.serialize_element(action)?,
            Self::Limit(n) => tuple.serialize_element(n)?,
            Self::As(name) | Self::Return(name) => tuple.serialize_element(name)?,
        }

        tuple.end()
    }
}

///
/// CriteriaList
///
/// Append-only ordered criteria. Entries are shared, so cloning a list is a
/// shallow copy: the clone's vector is independent, its entries are not.
///

#[derive(Clone, Debug, Default, Deref, PartialEq, Serialize)]
pub struct CriteriaList(Vec<Arc<Criterion>>);

impl CriteriaList {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, criterion: Criterion) {
        trace!(kind = %criterion.kind(), position = self.0.len(), "append criterion");
        self.0.push(Arc::new(criterion));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn kinds(&self) -> impl Iterator<Item = CriterionKind> {
        self.0.iter().map(|c| c.kind())
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.0.iter().filter_map(|c| match c.as_ref() {
            Criterion::Constraint(constraint) => Some(constraint),
            _ => None,
        })
    }

    /// Last action entry, i.e. the one the adapter should perform.
    #[must_use]
    pub fn action(&self) -> Option<&Action> {
        self.0.iter().rev().find_map(|c| match c.as_ref() {
            Criterion::Action(action) => Some(action),
            _ => None,
        })
    }

    /// Last limit entry.
    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.0.iter().rev().find_map(|c| match c.as_ref() {
            Criterion::Limit(n) => Some(*n),
            _ => None,
        })
    }

    /// Render as a JSON array of `[kind, payload]` pairs.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// True when both lists hold the very same entry at every position.
    #[must_use]
    pub fn shares_entries_with(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}
