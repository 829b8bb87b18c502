//! Dotted reference resolution.
//!
//! Turns `"attr"`, `"model.attr"` and `"adapter.model.attr"` into structured
//! references. Dispatch is purely on segment count; literal dots inside
//! identifiers are not supported.

use crate::error::{ErrorClass, ErrorOrigin};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Adapter segment given to references that do not name one.
pub const DEFAULT_ADAPTER: &str = "memory";

///
/// PathError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("invalid path '{path}': expected 1 to {max} segments, found {segments}")]
    InvalidPath {
        path: String,
        segments: usize,
        max: usize,
    },

    #[error("invalid path '{path}': empty segment")]
    EmptySegment { path: String },

    #[error("cannot resolve bare attribute '{attr}' without a start model")]
    MissingStartModel { attr: String },
}

impl PathError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Invalid
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Path
    }
}

///
/// PathRef
///
/// Resolved `adapter.model.attr` reference.
///
/// `namespace` is `adapter.model` when the adapter was written out, else
/// `model`; `path` is always `namespace.attr`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct PathRef {
    pub adapter: String,
    pub model: String,
    pub attr: String,
    pub namespace: String,
    pub path: String,
}

impl PathRef {
    fn new(adapter: &str, model: &str, attr: &str, explicit_adapter: bool) -> Self {
        let namespace = if explicit_adapter {
            format!("{adapter}.{model}")
        } else {
            model.to_string()
        };
        let path = format!("{namespace}.{attr}");

        Self {
            adapter: adapter.to_string(),
            model: model.to_string(),
            attr: attr.to_string(),
            namespace,
            path,
        }
    }

    /// True when the adapter segment was written out rather than defaulted.
    #[must_use]
    pub fn has_explicit_adapter(&self) -> bool {
        self.namespace != self.model
    }
}

///
/// ModelRef
///
/// Resolved `model` or `adapter.model` reference used by `start`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct ModelRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    pub model: String,
    pub namespace: String,
}

///
/// PathResolver
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathResolver {
    default_adapter: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ADAPTER)
    }
}

impl PathResolver {
    #[must_use]
    pub fn new(default_adapter: impl Into<String>) -> Self {
        Self {
            default_adapter: default_adapter.into(),
        }
    }

    #[must_use]
    pub fn default_adapter(&self) -> &str {
        &self.default_adapter
    }

    /// Resolve an attribute reference.
    ///
    /// Bare attributes take their model from `start`, which may itself be
    /// `adapter.model`.
    pub fn resolve(&self, dotted: &str, start: Option<&str>) -> Result<PathRef, PathError> {
        match split(dotted, 3)? {
            Segments::Three(adapter, model, attr) => Ok(PathRef::new(adapter, model, attr, true)),
            Segments::Two(model, attr) => {
                Ok(PathRef::new(&self.default_adapter, model, attr, false))
            }
            Segments::One(attr) => {
                let start = start.ok_or_else(|| PathError::MissingStartModel {
                    attr: attr.to_string(),
                })?;

                match start.split_once('.') {
                    Some((adapter, model)) => Ok(PathRef::new(adapter, model, attr, true)),
                    None => Ok(PathRef::new(&self.default_adapter, start, attr, false)),
                }
            }
        }
    }

    /// Resolve a model reference (`model` or `adapter.model`).
    pub fn resolve_model(&self, dotted: &str) -> Result<ModelRef, PathError> {
        match split(dotted, 2)? {
            Segments::Two(adapter, model) => Ok(ModelRef {
                adapter: Some(adapter.to_string()),
                model: model.to_string(),
                namespace: format!("{adapter}.{model}"),
            }),
            Segments::One(model) => Ok(ModelRef {
                adapter: None,
                model: model.to_string(),
                namespace: model.to_string(),
            }),
            Segments::Three(..) => Err(PathError::InvalidPath {
                path: dotted.to_string(),
                segments: 3,
                max: 2,
            }),
        }
    }
}

///
/// Segments
///

enum Segments<'a> {
    One(&'a str),
    Two(&'a str, &'a str),
    Three(&'a str, &'a str, &'a str),
}

// Split on '.', rejecting empty segments and counts outside 1..=max.
fn split(dotted: &str, max: usize) -> Result<Segments<'_>, PathError> {
    let parts: Vec<&str> = dotted.split('.').collect();

    if parts.iter().any(|s| s.is_empty()) {
        return Err(PathError::EmptySegment {
            path: dotted.to_string(),
        });
    }

    match (parts.as_slice(), max) {
        ([one], _) => Ok(Segments::One(one)),
        ([model, attr], 2..) => Ok(Segments::Two(model, attr)),
        ([adapter, model, attr], 3..) => Ok(Segments::Three(adapter, model, attr)),
        _ => Err(PathError::InvalidPath {
            path: dotted.to_string(),
            segments: parts.len(),
            max,
        }),
    }
}

///
/// TESTS
///
