use crate::value::Value;
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::debug;

///
/// Predicate
///
/// Named comparison `(actual, expected) -> bool`. Shared so registries and
/// compiled attribute/param checks can hold the same function.
///

pub type Predicate = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

///
/// ValidatorRegistry
///
/// Name → predicate map with insertion order preserved.
/// Registering an existing name replaces the predicate and appends the name
/// again to the order list.
///

#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    by_name: HashMap<String, Predicate>,
    order: Vec<String>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in comparison validators installed.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::install(&mut registry);

        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(predicate))
    }

    /// Register an already shared predicate, e.g. one aliased under several names.
    pub fn register_shared(&mut self, name: impl Into<String>, predicate: Predicate) -> &mut Self {
        let name = name.into();
        debug!(validator = %name, "register validator");

        self.order.push(name.clone());
        self.by_name.insert(name, predicate);

        self
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Predicate> {
        self.by_name.get(name).cloned()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registration order, including repeated names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.order.clear();
    }

    /// Scoped view registering and looking up under `"{prefix}.{name}"`.
    pub fn ns(&mut self, prefix: impl Into<String>) -> Namespace<'_> {
        Namespace {
            registry: self,
            prefix: prefix.into(),
        }
    }

    /// Look up `name` under `prefix` without borrowing mutably.
    #[must_use]
    pub fn lookup_in(&self, prefix: &str, name: &str) -> Option<Predicate> {
        self.lookup(&format!("{prefix}.{name}"))
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

///
/// Namespace
///

pub struct Namespace<'a> {
    registry: &'a mut ValidatorRegistry,
    prefix: String,
}

impl Namespace<'_> {
    pub fn register<F>(&mut self, name: &str, predicate: F) -> &mut Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(predicate))
    }

    pub fn register_shared(&mut self, name: &str, predicate: Predicate) -> &mut Self {
        let key = self.key(name);
        self.registry.register_shared(key, predicate);

        self
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Predicate> {
        self.registry.lookup(&self.key(name))
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, name: &str) -> String {
        format!("{}.{name}", self.prefix)
    }
}

///
/// TESTS
///
