use crate::{
    adapter::{Adapter, AdapterRef, AdapterRegistry},
    context::Context,
    error::{BoxError, ErrorClass, ErrorOrigin},
    query::{Query, QueryError, criteria::ActionKind},
    validate::{PipelineError, Validatable, Validator, ValidatorRegistry, run},
    value::Value,
};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// ExecError
///

#[derive(Debug, ThisError)]
pub enum ExecError {
    #[error("no adapter registered")]
    NoAdapter,

    #[error("adapter '{0}' is not registered")]
    UnknownAdapter(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("adapter error: {0}")]
    Adapter(#[source] BoxError),
}

impl ExecError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NoAdapter | Self::UnknownAdapter(_) => ErrorClass::Unavailable,
            Self::Query(err) => err.class(),
            Self::Pipeline(err) => err.class(),
            Self::Validation(_) => ErrorClass::Validation,
            Self::Adapter(_) => ErrorClass::External,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::NoAdapter | Self::UnknownAdapter(_) | Self::Adapter(_) => ErrorOrigin::Adapter,
            Self::Query(err) => err.origin(),
            Self::Pipeline(err) => err.origin(),
            Self::Validation(_) => ErrorOrigin::Query,
        }
    }
}

impl Query {
    /// Validate and dispatch to the selected adapter.
    ///
    /// Accumulated validation messages are returned as
    /// [`ExecError::Validation`] and the adapter is not called.
    pub async fn exec(mut self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.context = None;
        self.start = None;

        let adapter = self.adapter(ctx.adapters())?;
        self.run_validators(adapter.as_ref(), ctx.validators()).await?;

        if !self.errors.is_empty() {
            warn!(
                query = ?self.name,
                errors = self.errors.len(),
                "query rejected by validation"
            );
            return Err(ExecError::Validation(std::mem::take(&mut self.errors)));
        }

        if let Some(explain) = &self.explain {
            explain(&self.criteria);
        }

        debug!(
            adapter = adapter.name(),
            query = ?self.name,
            criteria = self.criteria.len(),
            "dispatch query"
        );

        adapter.exec(&self).await.map_err(ExecError::Adapter)
    }

    /// Run the validation pipeline without dispatching.
    ///
    /// Messages are left on [`Validatable::errors`]; `Ok(true)` means none
    /// were reported.
    pub async fn validate(&mut self, ctx: &Context) -> Result<bool, ExecError> {
        let adapter = self.adapter(ctx.adapters())?;
        self.run_validators(adapter.as_ref(), ctx.validators()).await?;

        Ok(self.is_valid())
    }

    /// Adapter this query would dispatch to: the first explicit one, else
    /// the first registered.
    pub fn adapter(&self, registry: &AdapterRegistry) -> Result<Arc<dyn Adapter>, ExecError> {
        match self.adapters.first() {
            Some(AdapterRef::Instance(adapter)) => Ok(Arc::clone(adapter)),
            Some(AdapterRef::Named(name)) => registry
                .get(name)
                .ok_or_else(|| ExecError::UnknownAdapter(name.clone())),
            None => registry.default_adapter().ok_or(ExecError::NoAdapter),
        }
    }

    // Constraint checks first, then attached validators.
    async fn run_validators(
        &mut self,
        adapter: &dyn Adapter,
        registry: &ValidatorRegistry,
    ) -> Result<(), PipelineError> {
        self.errors.clear();

        let mut validators = self.constraint_validators(adapter, registry);
        validators.extend(self.validators.iter().cloned());

        run(&validators, self).await
    }

    fn constraint_validators(
        &self,
        adapter: &dyn Adapter,
        registry: &ValidatorRegistry,
    ) -> Vec<Validator<Self>> {
        self.criteria
            .constraints()
            .filter_map(|constraint| {
                let checks = adapter.param(&constraint.left)?.compile(registry);
                let constraint = constraint.clone();

                Some(Validator::check(move |query: &mut Self| {
                    for message in checks.issues(&constraint) {
                        query.report(message);
                    }
                }))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Terminal shorthands
    // ---------------------------------------------------------------------

    pub async fn find(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Find, None).exec(ctx).await
    }

    pub async fn all(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.find(ctx).await
    }

    pub async fn remove(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Remove, None).exec(ctx).await
    }

    pub async fn pipe(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Pipe, None).exec(ctx).await
    }

    pub async fn stream(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Stream, None).exec(ctx).await
    }

    pub async fn count(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Count, None).exec(ctx).await
    }

    pub async fn exists(self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Exists, None).exec(ctx).await
    }

    pub async fn create(
        self,
        data: impl Into<Value>,
        ctx: &Context,
    ) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Create, Some(data.into()))
            .exec(ctx)
            .await
    }

    pub async fn update(
        self,
        data: impl Into<Value>,
        ctx: &Context,
    ) -> Result<Vec<Value>, ExecError> {
        self.action(ActionKind::Update, Some(data.into()))
            .exec(ctx)
            .await
    }

    /// Find at most one record and return it.
    pub async fn first(self, ctx: &Context) -> Result<Option<Value>, ExecError> {
        let records = self.limit(1).find(ctx).await?;

        Ok(records.into_iter().next())
    }

    /// Same request as [`Query::first`]: `limit(1)` then `find`. An adapter
    /// that honours the limit yields the same record `first` would; the
    /// tail only differs when the adapter returns more than asked for.
    pub async fn last(self, ctx: &Context) -> Result<Option<Value>, ExecError> {
        let mut records = self.limit(1).find(ctx).await?;

        Ok(records.pop())
    }
}
