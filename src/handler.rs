//! Error handlers deciding what a traversal does with a failure
//!
//! The set of handlers is closed: [`Break`], [`Ignore`] and [`Settle`]. Each
//! one fixes two things at the type level:
//!
//! - `Abort`, the value a traversal stops with. Only `Break` can abort, the
//!   other two use [`Infallible`].
//! - `Compiled<D>`, the shape a finalizer returns its data in.
//!
//! | handler  | finalizer output               |
//! |----------|--------------------------------|
//! | `Break`  | `Result<D, StreamError>`       |
//! | `Ignore` | `D`                            |
//! | `Settle` | [`Settled<D>`] (data + errors) |

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StreamError;
use crate::stream_configuration::Policy;

mod private {
    pub trait Sealed {}
}

/// Policy object shared by every stream of one chain
pub trait ErrorHandler: private::Sealed + Clone + Send + Sync + 'static {
    /// Value a traversal aborts with
    type Abort: Send + 'static;
    /// Finalizer output for data `D`
    type Compiled<D>;

    fn policy(&self) -> Policy;

    /// Register a contextualized error. `Err` aborts the traversal.
    fn register(&self, error: StreamError) -> Result<(), Self::Abort>;

    /// Box a finalizer's outcome into this handler's output shape
    fn compile<D>(&self, outcome: Result<D, Self::Abort>) -> Self::Compiled<D>;
}

/// Fail fast: the first error aborts the traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Break;

impl private::Sealed for Break {}

impl ErrorHandler for Break {
    type Abort = StreamError;
    type Compiled<D> = Result<D, StreamError>;

    fn policy(&self) -> Policy {
        Policy::Break
    }

    fn register(&self, error: StreamError) -> Result<(), StreamError> {
        log::debug!("aborting traversal: {}", error);
        Err(error)
    }

    fn compile<D>(&self, outcome: Result<D, StreamError>) -> Result<D, StreamError> {
        outcome
    }
}

/// Swallow errors: failing items are dropped as if filtered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ignore;

impl private::Sealed for Ignore {}

impl ErrorHandler for Ignore {
    type Abort = Infallible;
    type Compiled<D> = D;

    fn policy(&self) -> Policy {
        Policy::Ignore
    }

    fn register(&self, error: StreamError) -> Result<(), Infallible> {
        log::debug!("ignoring stream error: {}", error);
        Ok(())
    }

    fn compile<D>(&self, outcome: Result<D, Infallible>) -> D {
        match outcome {
            Ok(data) => data,
            Err(never) => match never {},
        }
    }
}

/// Collect errors: failing items are dropped and their errors are reported
/// next to the data.
///
/// Clones share one error list, so every stream derived from the same origin
/// records into the same place.
#[derive(Debug, Clone, Default)]
pub struct Settle {
    errors: Arc<Mutex<Vec<StreamError>>>,
}

impl Settle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the errors recorded so far
    pub fn errors(&self) -> Vec<StreamError> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StreamError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl private::Sealed for Settle {}

impl ErrorHandler for Settle {
    type Abort = Infallible;
    type Compiled<D> = Settled<D>;

    fn policy(&self) -> Policy {
        Policy::Settle
    }

    fn register(&self, error: StreamError) -> Result<(), Infallible> {
        log::debug!("settling stream error: {}", error);
        self.lock().push(error);
        Ok(())
    }

    fn compile<D>(&self, outcome: Result<D, Infallible>) -> Settled<D> {
        let data = match outcome {
            Ok(data) => data,
            Err(never) => match never {},
        };
        Settled {
            data,
            errors: self.errors(),
        }
    }
}

/// Finalizer output under [`Settle`]
#[derive(Debug, Clone)]
pub struct Settled<D> {
    pub data: D,
    pub errors: Vec<StreamError>,
}

impl<D> Settled<D> {
    /// `true` when no error was recorded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (D, Vec<StreamError>) {
        (self.data, self.errors)
    }

    /// `Ok(data)` when clean, otherwise the recorded errors
    pub fn into_result(self) -> Result<D, Vec<StreamError>> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;

    fn sample(index: usize) -> StreamError {
        Fault::operation("map", index.to_string(), "bad item").at(index)
    }

    #[test]
    fn test_break_aborts() {
        let error = Break.register(sample(1)).unwrap_err();
        assert_eq!(error.index(), 1);
        assert_eq!(Break.compile(Ok::<_, StreamError>(3)).unwrap(), 3);
    }

    #[test]
    fn test_ignore_swallows() {
        assert!(Ignore.register(sample(0)).is_ok());
        assert_eq!(Ignore.compile(Ok(vec![1, 2])), vec![1, 2]);
    }

    #[test]
    fn test_settle_shares_errors_between_clones() {
        let settle = Settle::new();
        let derived = settle.clone();
        derived.register(sample(0)).unwrap();
        settle.register(sample(4)).unwrap();

        assert_eq!(settle.len(), 2);
        let settled = derived.compile(Ok("data"));
        assert_eq!(settled.data, "data");
        assert_eq!(
            settled.errors.iter().map(StreamError::index).collect::<Vec<_>>(),
            vec![0, 4]
        );
        assert!(!settled.is_clean());
    }

    #[test]
    fn test_settled_into_result() {
        let clean = Settle::new().compile(Ok(5));
        assert_eq!(clean.into_result().unwrap(), 5);
    }

    #[test]
    fn test_policy_tags() {
        assert_eq!(Break.policy(), Policy::Break);
        assert_eq!(Ignore.policy(), Policy::Ignore);
        assert_eq!(Settle::new().policy(), Policy::Settle);
    }
}
