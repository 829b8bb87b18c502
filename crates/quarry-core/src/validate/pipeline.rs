//! Ordered validation pipeline.
//!
//! Validators run strictly in registration order against one mutable target.
//! Two outcomes are kept apart: a fatal stop ([`PipelineError`]) and the
//! accumulated messages a validator pushes onto the target
//! ([`Validatable::errors`]), which never stop the run.

use crate::error::{BoxError, ErrorClass, ErrorOrigin};
use futures::future::BoxFuture;
use std::{fmt, ops::ControlFlow, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// PipelineError
///

#[derive(Debug, ThisError)]
pub enum PipelineError {
    #[error("validation halted by validator #{index}")]
    Halted { index: usize },

    #[error("validator #{index} failed: {source}")]
    Failed {
        index: usize,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Aborted
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Pipeline
    }

    /// Position of the validator that stopped the run.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Halted { index } | Self::Failed { index, .. } => *index,
        }
    }
}

///
/// Validatable
///
/// Entity carrying an accumulated list of validation messages.
///

pub trait Validatable {
    fn errors(&self) -> &[String];

    fn errors_mut(&mut self) -> &mut Vec<String>;

    /// Push one message onto the accumulated list.
    fn report(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.errors_mut().push(message.into());
    }

    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

type SyncFn<T> = dyn Fn(&mut T) -> ControlFlow<()> + Send + Sync;
type AsyncFn<T> = dyn for<'a> Fn(&'a mut T) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync;

///
/// Validator
///
/// Sync     → runs inline; `Break` stops the pipeline.
/// Async    → awaited before the next step; `Err` stops the pipeline.
///

pub enum Validator<T> {
    Sync(Arc<SyncFn<T>>),
    Async(Arc<AsyncFn<T>>),
}

impl<T> Validator<T> {
    #[must_use]
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut T) -> ControlFlow<()> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Synchronous validator that never stops the pipeline.
    #[must_use]
    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        Self::sync(move |target| {
            f(target);
            ControlFlow::Continue(())
        })
    }

    #[must_use]
    pub fn from_async<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync + 'static,
    {
        Self::Async(Arc::new(f))
    }

    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_async() { "async" } else { "sync" };
        f.debug_tuple("Validator").field(&mode).finish()
    }
}

/// Run `validators` against `target` in order.
///
/// Returns the first fatal stop; accumulated messages are left on the target.
pub async fn run<T: Send>(
    validators: &[Validator<T>],
    target: &mut T,
) -> Result<(), PipelineError> {
    for (index, validator) in validators.iter().enumerate() {
        match validator {
            Validator::Sync(f) => {
                debug!(index, mode = "sync", "validator step");

                if f(&mut *target).is_break() {
                    warn!(index, "validation pipeline halted");
                    return Err(PipelineError::Halted { index });
                }
            }
            Validator::Async(f) => {
                debug!(index, mode = "async", "validator step");

                if let Err(source) = f(&mut *target).await {
                    warn!(index, error = %source, "validation pipeline failed");
                    return Err(PipelineError::Failed { index, source });
                }
            }
        }
    }

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[derive(Default)]
    struct Target {
        errors: Vec<String>,
        trail: Vec<&'static str>,
    }

    impl Validatable for Target {
        fn errors(&self) -> &[String] {
            &self.errors
        }

        fn errors_mut(&mut self) -> &mut Vec<String> {
            &mut self.errors
        }
    }

    fn step(label: &'static str) -> Validator<Target> {
        Validator::check(move |t: &mut Target| t.trail.push(label))
    }

    #[tokio::test]
    async fn empty_pipeline_completes() {
        let mut target = Target::default();

        run(&[], &mut target).await.expect("empty pipeline should complete");
        assert!(target.is_valid());
    }

    #[tokio::test]
    async fn validators_run_in_registration_order() {
        let mut target = Target::default();
        let validators = vec![step("a"), step("b"), step("c")];

        run(&validators, &mut target).await.expect("pipeline should complete");
        assert_eq!(target.trail, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn sync_break_halts_remaining_validators() {
        let mut target = Target::default();
        let validators = vec![
            Validator::sync(|t: &mut Target| {
                t.trail.push("v1");
                ControlFlow::Break(())
            }),
            step("v2"),
        ];

        let err = run(&validators, &mut target)
            .await
            .expect_err("break should halt the pipeline");

        assert!(matches!(err, PipelineError::Halted { index: 0 }));
        assert_eq!(target.trail, vec!["v1"]);
    }

    #[tokio::test]
    async fn async_success_resumes_with_next_validator() {
        let mut target = Target::default();
        let validators = vec![
            Validator::from_async(|t: &mut Target| {
                async move {
                    tokio::task::yield_now().await;
                    t.trail.push("async");
                    Ok(())
                }
                .boxed()
            }),
            step("after"),
        ];

        run(&validators, &mut target).await.expect("pipeline should complete");
        assert_eq!(target.trail, vec!["async", "after"]);
    }

    #[tokio::test]
    async fn async_error_aborts_with_source() {
        let mut target = Target::default();
        let validators = vec![
            step("before"),
            Validator::from_async(|_: &mut Target| {
                async { Err(BoxError::from("remote check failed")) }.boxed()
            }),
            step("after"),
        ];

        let err = run(&validators, &mut target)
            .await
            .expect_err("async error should abort");

        assert_eq!(err.index(), 1);
        assert!(err.to_string().contains("remote check failed"));
        assert_eq!(target.trail, vec!["before"]);
    }

    #[tokio::test]
    async fn reported_messages_accumulate_without_aborting() {
        let mut target = Target::default();
        let validators = vec![
            Validator::check(|t: &mut Target| t.report("first")),
            Validator::check(|t: &mut Target| t.report("second")),
        ];

        run(&validators, &mut target).await.expect("messages are not fatal");
        assert_eq!(target.errors(), ["first", "second"]);
        assert!(!target.is_valid());
    }
}
