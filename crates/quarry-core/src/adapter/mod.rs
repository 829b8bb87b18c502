//! Pluggable backends.
//!
//! An adapter receives the finished query (criteria included) and performs
//! the data operation. The core never interprets results.

use crate::{error::BoxError, model::Param, path::PathRef, query::Query, value::Value};
use async_trait::async_trait;
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, warn};

///
/// Adapter
///

#[async_trait]
pub trait Adapter: Send + Sync {
    /// Registry key; also the adapter segment written in dotted paths.
    fn name(&self) -> &str;

    /// Execute the query and produce records.
    async fn exec(&self, query: &Query) -> Result<Vec<Value>, BoxError>;

    /// Parameter definition for a constraint path, used to validate
    /// constraints before dispatch.
    fn param(&self, _path: &PathRef) -> Option<Param> {
        None
    }
}

///
/// AdapterRef
///
/// Builder-level adapter selection: a registry name resolved at exec time,
/// or an adapter handed over directly.
///

#[derive(Clone)]
pub enum AdapterRef {
    Named(String),
    Instance(Arc<dyn Adapter>),
}

impl AdapterRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Instance(adapter) => adapter.name(),
        }
    }
}

impl fmt::Debug for AdapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Instance(adapter) => f.debug_tuple("Instance").field(&adapter.name()).finish(),
        }
    }
}

impl From<&str> for AdapterRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for AdapterRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Adapter>> for AdapterRef {
    fn from(adapter: Arc<dyn Adapter>) -> Self {
        Self::Instance(adapter)
    }
}

///
/// AdapterRegistry
///
/// Keyed map plus registration order. The first registrant is the implicit
/// default; re-registering a name replaces the keyed entry only.
///

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    by_name: HashMap<String, Arc<dyn Adapter>>,
    order: Vec<Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn Adapter>) -> &mut Self {
        let name = adapter.name().to_string();

        if self.by_name.contains_key(&name) {
            warn!(adapter = %name, "adapter re-registered; keyed entry replaced");
        } else {
            debug!(adapter = %name, position = self.order.len(), "register adapter");
        }

        self.order.push(Arc::clone(&adapter));
        self.by_name.insert(name, adapter);

        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.by_name.get(name).cloned()
    }

    /// First registered adapter.
    #[must_use]
    pub fn default_adapter(&self) -> Option<Arc<dyn Adapter>> {
        self.order.first().cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Adapter>> {
        self.order.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.order.clear();
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.order.iter().map(|a| a.name()))
            .finish()
    }
}

///
/// TESTS
///
