//! Injectable bundle of every registry.
//!
//! Nothing in the crate is process-global; callers own a [`Context`] and pass
//! it to `exec`, `validate` and the model operations.

use crate::{
    adapter::{Adapter, AdapterRegistry},
    config::Config,
    model::{Model, ModelRegistry},
    path::PathResolver,
    query::{Query, QueryCache},
    validate::ValidatorRegistry,
};
use std::sync::Arc;

///
/// Context
///

#[derive(Debug)]
pub struct Context {
    config: Config,
    resolver: PathResolver,
    adapters: AdapterRegistry,
    validators: ValidatorRegistry,
    queries: QueryCache,
    models: ModelRegistry,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            resolver: PathResolver::new(config.default_adapter.clone()),
            validators: Self::initial_validators(&config),
            adapters: AdapterRegistry::new(),
            queries: QueryCache::new(),
            models: ModelRegistry::new(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub const fn adapters_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.adapters
    }

    #[must_use]
    pub const fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub const fn validators_mut(&mut self) -> &mut ValidatorRegistry {
        &mut self.validators
    }

    #[must_use]
    pub const fn queries(&self) -> &QueryCache {
        &self.queries
    }

    #[must_use]
    pub const fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Register an adapter; the first one registered is the default.
    pub fn use_adapter(&mut self, adapter: Arc<dyn Adapter>) -> &mut Self {
        self.adapters.register(adapter);
        self
    }

    pub fn define_model(&mut self, model: Model) -> Arc<Model> {
        self.models.define(model)
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<Arc<Model>> {
        self.models.get(name)
    }

    /// Fresh unnamed query using the configured resolver.
    #[must_use]
    pub fn new_query(&self) -> Query {
        Query::with_resolver(self.resolver.clone())
    }

    /// Clone of the named query, created on first use.
    #[must_use]
    pub fn query(&self, name: &str) -> Query {
        self.queries.query(name, &self.resolver)
    }

    /// Define a named query once; later definitions are ignored.
    pub fn define_query(&self, name: &str, query: Query) -> Query {
        self.queries.define(name, query)
    }

    /// Clear every registry and reinstall the configured builtins.
    pub fn reset(&mut self) {
        self.adapters.clear();
        self.queries.clear();
        self.models.clear();
        self.validators = Self::initial_validators(&self.config);
    }

    fn initial_validators(config: &Config) -> ValidatorRegistry {
        if config.builtin_validators {
            ValidatorRegistry::with_builtins()
        } else {
            ValidatorRegistry::new()
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
