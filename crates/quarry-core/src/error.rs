use std::fmt;

///
/// BoxError
///
/// Opaque error carried through from adapters and asynchronous validators.
/// The core never inspects it.
///

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

///
/// ErrorClass
/// Runtime classification shared by every module error.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Malformed input detected while building.
    Invalid,
    /// Accumulated validation messages rejected the target.
    Validation,
    /// A validator aborted the pipeline.
    Aborted,
    /// A required collaborator (adapter) is not available.
    Unavailable,
    /// Error produced outside the core.
    External,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Invalid => "invalid",
            Self::Validation => "validation",
            Self::Aborted => "aborted",
            Self::Unavailable => "unavailable",
            Self::External => "external",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem an error was raised in.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Path,
    Query,
    Pipeline,
    Adapter,
    Config,
    Model,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Pipeline => "pipeline",
            Self::Adapter => "adapter",
            Self::Config => "config",
            Self::Model => "model",
        };
        write!(f, "{label}")
    }
}
