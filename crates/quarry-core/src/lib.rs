//! Core runtime for Quarry: dotted path resolution, the criteria IR and its
//! fluent builder, adapter dispatch, the validation pipeline and model
//! definitions, all reachable through an injectable `Context`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod adapter;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod path;
pub mod query;
pub mod validate;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary plus the traits needed to
/// implement adapters and validated entities.
///

pub mod prelude {
    pub use crate::{
        adapter::Adapter,
        context::Context,
        model::{Attr, Model, Param, Record},
        query::{ActionKind, Query},
        validate::{Validatable, Validator},
        value::Value,
    };
}
