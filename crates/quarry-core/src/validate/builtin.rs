//! Built-in comparison validators.
//!
//! Every predicate is `(actual, expected)`. Membership operators read as
//! "actual is in expected", so `in("a", ["a", "b"])` holds.

use super::registry::{Predicate, ValidatorRegistry};
use crate::value::{Value, includes, loose_cmp, loose_eq};
use regex::Regex;
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Operator names shared by the base, `attr.` and `param.` namespaces.
pub const OPERATORS: [&str; 11] = [
    "eq", "neq", "contains", "in", "excludes", "nin", "gte", "gt", "lte", "lt", "match",
];

/// Compiled patterns kept per registry before the cache is reset.
const PATTERN_CACHE_LIMIT: usize = 256;

/// Install base operators plus the `attr.` and `param.` namespaces.
pub(crate) fn install(registry: &mut ValidatorRegistry) {
    let patterns = PatternCache::default();
    let contains: Predicate =
        Arc::new(|actual: &Value, expected: &Value| includes(expected, actual));
    let excludes: Predicate =
        Arc::new(|actual: &Value, expected: &Value| !includes(expected, actual));

    registry
        .register("eq", loose_eq)
        .register("neq", |a, b| !loose_eq(a, b))
        .register_shared("contains", contains.clone())
        .register_shared("in", contains)
        .register_shared("excludes", excludes.clone())
        .register_shared("nin", excludes)
        .register("gte", |a, b| ordered(a, b, Ordering::is_ge))
        .register("gt", |a, b| ordered(a, b, Ordering::is_gt))
        .register("lte", |a, b| ordered(a, b, Ordering::is_le))
        .register("lt", |a, b| ordered(a, b, Ordering::is_lt))
        .register("match", move |actual: &Value, pattern: &Value| {
            patterns.is_match(actual, pattern)
        });

    for prefix in ["attr", "param"] {
        let shared: Vec<(&str, Predicate)> = OPERATORS
            .iter()
            .filter_map(|op| registry.lookup(op).map(|p| (*op, p)))
            .collect();

        let mut ns = registry.ns(prefix);
        ns.register("present", |actual, _| !actual.is_null());
        for (op, predicate) in shared {
            ns.register_shared(op, predicate);
        }
    }
}

fn ordered(a: &Value, b: &Value, accept: fn(Ordering) -> bool) -> bool {
    loose_cmp(a, b).is_some_and(accept)
}

///
/// PatternCache
///
/// Compiled `match` patterns keyed by source. Invalid sources are cached as
/// `None` so they fail without recompiling.
///

#[derive(Debug, Default)]
struct PatternCache(RwLock<HashMap<String, Option<Regex>>>);

impl PatternCache {
    // Text matched against a regex source; anything else, or a bad pattern, fails.
    fn is_match(&self, actual: &Value, pattern: &Value) -> bool {
        let (Some(text), Some(source)) = (actual.as_text(), pattern.as_text()) else {
            return false;
        };

        if let Some(compiled) = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
        {
            return compiled.as_ref().is_some_and(|re| re.is_match(text));
        }

        let compiled = Regex::new(source).ok();
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(text));

        let mut cache = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() >= PATTERN_CACHE_LIMIT {
            cache.clear();
        }
        cache.insert(source.to_string(), compiled);

        matched
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

///
/// TESTS
///
