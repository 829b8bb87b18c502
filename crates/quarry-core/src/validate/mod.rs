mod builtin;
pub mod pipeline;
mod registry;

pub use builtin::OPERATORS;
pub use pipeline::{PipelineError, Validatable, Validator, run};
pub use registry::{Namespace, Predicate, ValidatorRegistry};
