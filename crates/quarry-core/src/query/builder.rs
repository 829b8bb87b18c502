use crate::{
    adapter::AdapterRef,
    path::{PathRef, PathResolver},
    query::{
        QueryError,
        constraint::{Constraint, Operator},
        criteria::{
            Action, ActionKind, CriteriaList, Criterion, Order, OrderDirection, Relation,
            RelationDirection,
        },
    },
    validate::{Validatable, Validator},
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// ExplainFn
///

pub type ExplainFn = Arc<dyn Fn(&CriteriaList) + Send + Sync>;

///
/// Query
///
/// Fluent builder over an append-only [`CriteriaList`].
///
/// Every step consumes the builder and returns it, so intermediate states
/// are plain values. Steps that resolve a dotted reference return
/// `Result<Self, QueryError>` and fail at the step that was malformed.
///
/// `start` and the active `where_attr` key are chain-local scope; `exec`
/// clears both.
///

#[derive(Clone)]
pub struct Query {
    pub(crate) name: Option<String>,
    pub(crate) criteria: CriteriaList,
    pub(crate) context: Option<String>,
    pub(crate) start: Option<String>,
    pub(crate) adapters: Vec<AdapterRef>,
    pub(crate) errors: Vec<String>,
    pub(crate) resolver: PathResolver,
    pub(crate) validators: Vec<Validator<Self>>,
    pub(crate) explain: Option<ExplainFn>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(PathResolver::default())
    }

    #[must_use]
    pub const fn with_resolver(resolver: PathResolver) -> Self {
        Self {
            name: None,
            criteria: CriteriaList::new(),
            context: None,
            start: None,
            adapters: Vec::new(),
            errors: Vec::new(),
            resolver,
            validators: Vec::new(),
            explain: None,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, resolver: PathResolver) -> Self {
        let mut query = Self::with_resolver(resolver);
        query.name = Some(name.into());

        query
    }

    /// Copy sharing the criteria entries, with chain-local `where_attr` scope
    /// and accumulated messages dropped. The start model is kept so bare
    /// attributes keep resolving.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            name: self.name.clone(),
            criteria: self.criteria.clone(),
            context: None,
            start: self.start.clone(),
            adapters: self.adapters.clone(),
            errors: Vec::new(),
            resolver: self.resolver.clone(),
            validators: self.validators.clone(),
            explain: self.explain.clone(),
        }
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn criteria(&self) -> &CriteriaList {
        &self.criteria
    }

    /// Model scope for bare attribute references.
    #[must_use]
    pub fn start_model(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Key set by the last `where_attr`.
    #[must_use]
    pub fn active_attribute(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[must_use]
    pub fn adapters(&self) -> &[AdapterRef] {
        &self.adapters
    }

    #[must_use]
    pub const fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.criteria.len()
    }

    // ---------------------------------------------------------------------
    // Scope
    // ---------------------------------------------------------------------

    /// Restrict dispatch to an adapter. The first one added wins at exec.
    #[must_use]
    pub fn using(mut self, adapter: impl Into<AdapterRef>) -> Self {
        self.adapters.push(adapter.into());
        self
    }

    /// Set the start model and append a `start` entry.
    pub fn start(mut self, key: &str) -> Result<Self, QueryError> {
        let model = self.resolver.resolve_model(key)?;
        self.start = Some(model.namespace.clone());

        Ok(self.push(Criterion::Start(model)))
    }

    /// Append a `select` entry; sets the start model if none is set yet.
    pub fn select(mut self, key: &str) -> Result<Self, QueryError> {
        let path = self.resolve(key)?;
        if self.start.is_none() {
            self.start = Some(path.namespace.clone());
        }

        Ok(self.push(Criterion::Select(path)))
    }

    /// Set the active attribute for the following comparison.
    #[must_use]
    pub fn where_attr(mut self, key: impl Into<String>) -> Self {
        self.context = Some(key.into());
        self
    }

    // ---------------------------------------------------------------------
    // Comparisons
    // ---------------------------------------------------------------------

    pub fn eq(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Eq, value)
    }

    pub fn neq(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Neq, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Gte, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Gt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Lte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Lt, value)
    }

    pub fn nin(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Nin, value)
    }

    pub fn matches(self, pattern: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::Match, pattern)
    }

    /// Membership; recorded with the `in` operator.
    pub fn contains(self, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.compare(Operator::In, value)
    }

    /// Append a constraint for an explicit key.
    pub fn constraint(
        self,
        key: &str,
        operator: impl Into<Operator>,
        value: impl Into<Value>,
    ) -> Result<Self, QueryError> {
        let left = self.resolve(key)?;

        Ok(self.push(Criterion::Constraint(Constraint::new(left, operator, value))))
    }

    fn compare(self, operator: Operator, value: impl Into<Value>) -> Result<Self, QueryError> {
        let Some(key) = self.context.clone() else {
            return Err(QueryError::NoActiveAttribute {
                operator: operator.name().to_string(),
            });
        };

        self.constraint(&key, operator, value)
    }

    // ---------------------------------------------------------------------
    // Traversal and ordering
    // ---------------------------------------------------------------------

    pub fn incoming(self, key: &str) -> Result<Self, QueryError> {
        self.relation(RelationDirection::Incoming, key)
    }

    pub fn outgoing(self, key: &str) -> Result<Self, QueryError> {
        self.relation(RelationDirection::Outgoing, key)
    }

    pub fn relation(self, direction: RelationDirection, key: &str) -> Result<Self, QueryError> {
        let path = self.resolve(key)?;

        Ok(self.push(Criterion::Relation(Relation { path, direction })))
    }

    pub fn asc(self, key: &str) -> Result<Self, QueryError> {
        self.order(OrderDirection::Asc, key)
    }

    pub fn desc(self, key: &str) -> Result<Self, QueryError> {
        self.order(OrderDirection::Desc, key)
    }

    pub fn order(self, direction: OrderDirection, key: &str) -> Result<Self, QueryError> {
        let path = self.resolve(key)?;

        Ok(self.push(Criterion::Order(Order { path, direction })))
    }

    // ---------------------------------------------------------------------
    // Shaping
    // ---------------------------------------------------------------------

    /// Name the result of the previous step.
    #[must_use]
    pub fn alias(self, key: impl Into<String>) -> Self {
        self.push(Criterion::As(key.into()))
    }

    #[must_use]
    pub fn returns(self, key: impl Into<String>) -> Self {
        self.push(Criterion::Return(key.into()))
    }

    #[must_use]
    pub fn limit(self, n: u32) -> Self {
        self.push(Criterion::Limit(n))
    }

    /// Append an action. A single data value is wrapped into a list.
    #[must_use]
    pub fn action(self, kind: impl Into<ActionKind>, data: Option<Value>) -> Self {
        self.push(Criterion::Action(Action::new(kind, data)))
    }

    #[must_use]
    pub fn reset(mut self) -> Self {
        self.criteria.clear();
        self
    }

    // ---------------------------------------------------------------------
    // Hooks
    // ---------------------------------------------------------------------

    /// Observe the criteria right before dispatch.
    #[must_use]
    pub fn explain<F>(mut self, f: F) -> Self
    where
        F: Fn(&CriteriaList) + Send + Sync + 'static,
    {
        self.explain = Some(Arc::new(f));
        self
    }

    /// Attach a query-level validator run during `exec`.
    #[must_use]
    pub fn validator(mut self, validator: Validator<Self>) -> Self {
        self.validators.push(validator);
        self
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn push(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    fn resolve(&self, key: &str) -> Result<PathRef, QueryError> {
        Ok(self.resolver.resolve(key, self.start.as_deref())?)
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Validatable for Query {
    fn errors(&self) -> &[String] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<String> {
        &mut self.errors
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.name)
            .field("criteria", &self.criteria)
            .field("start", &self.start)
            .field("context", &self.context)
            .field("adapters", &self.adapters)
            .field("errors", &self.errors)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}
