use crate::{path::PathResolver, query::Query};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use tracing::{debug, warn};

///
/// QueryCache
///
/// Named queries, define-once. Lookups hand out forks so callers can keep
/// chaining without touching the cached instance or inheriting its
/// active attribute.
///

#[derive(Debug, Default)]
pub struct QueryCache {
    queries: RwLock<HashMap<String, Query>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fork of the cached query, or a fresh empty one carrying `name`.
    /// A miss caches nothing, so a later `define` still takes effect.
    #[must_use]
    pub fn query(&self, name: &str, resolver: &PathResolver) -> Query {
        self.get(name).unwrap_or_else(|| {
            debug!(query = name, "named query not defined; starting empty");
            Query::named(name, resolver.clone())
        })
    }

    /// Store `query` under `name` unless a query by that name already exists.
    /// Returns a fork of whichever query is cached afterwards.
    pub fn define(&self, name: &str, mut query: Query) -> Query {
        let mut queries = self.queries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = queries.get(name) {
            warn!(query = name, "named query already defined; redefinition ignored");
            return existing.fork();
        }

        debug!(query = name, criteria = query.size(), "define named query");
        query.name = Some(name.to_string());
        let stored = query.fork();
        queries.insert(name.to_string(), stored);

        query.fork()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Query> {
        self.queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Query::fork)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.queries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
