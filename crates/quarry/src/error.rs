use derive_more::Display;
use quarry_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin},
    path::PathError,
    query::{ExecError, QueryError},
    validate::PipelineError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Accumulated validation messages, if this error carries any.
    #[must_use]
    pub fn validation_messages(&self) -> Option<&[String]> {
        match &self.kind {
            ErrorKind::Validation(messages) => Some(messages.as_slice()),
            _ => None,
        }
    }

    fn classified(class: ErrorClass, origin: CoreErrorOrigin, message: String) -> Self {
        let kind = match class {
            ErrorClass::Invalid => ErrorKind::Invalid,
            ErrorClass::Validation => ErrorKind::Validation(Vec::new()),
            ErrorClass::Aborted => ErrorKind::Aborted,
            ErrorClass::Unavailable => ErrorKind::Unavailable,
            ErrorClass::External => ErrorKind::Adapter,
        };

        Self::new(kind, origin.into(), message)
    }
}

impl From<PathError> for Error {
    fn from(err: PathError) -> Self {
        Self::classified(err.class(), err.origin(), err.to_string())
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::classified(err.class(), err.origin(), err.to_string())
    }
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        Self::classified(err.class(), err.origin(), err.to_string())
    }
}

impl From<ExecError> for Error {
    fn from(err: ExecError) -> Self {
        let message = err.to_string();

        match err {
            ExecError::Validation(messages) => {
                Self::new(ErrorKind::Validation(messages), ErrorOrigin::Query, message)
            }
            other => Self::classified(other.class(), other.origin(), message),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.origin().into(), err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Malformed path or builder step.
    Invalid,

    /// Validators reported these messages; nothing was dispatched.
    Validation(Vec<String>),

    /// A validator stopped the pipeline.
    Aborted,

    /// No adapter could be selected.
    Unavailable,

    /// The adapter failed; the message is its own.
    Adapter,

    Config,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Path,
    Query,
    Pipeline,
    Adapter,
    Config,
    Model,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Path => Self::Path,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Pipeline => Self::Pipeline,
            CoreErrorOrigin::Adapter => Self::Adapter,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Model => Self::Model,
        }
    }
}
