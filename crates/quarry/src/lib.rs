//! ## Crate layout
//! - `core`: values, path resolution, criteria, the query builder, adapters,
//!   validators, models and the `Context` that bundles their registries.
//! - `error`: the public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module re-exports what application code needs to build
//! queries, define models and implement adapters.

pub use quarry_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error,
        core::{
            adapter::{Adapter, AdapterRef},
            config::Config,
            context::Context,
            error::BoxError,
            model::{Attr, Model, Param, Record},
            query::{ActionKind, CriteriaList, Query},
            validate::{Validatable as _, Validator},
            value::Value,
        },
        error::{ErrorKind, ErrorOrigin},
    };
}
