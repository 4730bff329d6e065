//! Error types for lazystream
//!
//! Failures are captured raw while an item travels through the operation
//! queue and only receive their index once the traversal routes them to the
//! active error handler.

use std::error::Error as StdError;
use std::sync::Arc;

/// Boxed error accepted from user-supplied sources and operations
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared form of a user error, kept so contextualized errors stay `Clone`
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Contextualized error raised by (or recorded during) a traversal
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    /// Pulling the next item from the source failed
    #[error("Error occurred at item at index {index} in iterator: {source}")]
    Cycle { index: usize, source: SharedError },
    /// A queued operation failed on an item
    #[error("Error occurred while performing {operation} on {item} at index {index} in iterator: {source}")]
    Operation {
        operation: &'static str,
        item: String,
        index: usize,
        source: SharedError,
    },
}

impl StreamError {
    /// Index of the pull at which the error happened
    pub fn index(&self) -> usize {
        match self {
            StreamError::Cycle { index, .. } | StreamError::Operation { index, .. } => *index,
        }
    }

    /// Name of the failing operation, `None` for cycle errors
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            StreamError::Cycle { .. } => None,
            StreamError::Operation { operation, .. } => Some(operation),
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, StreamError::Cycle { .. })
    }

    /// The error as originally produced by the source or operation
    pub fn cause(&self) -> &SharedError {
        match self {
            StreamError::Cycle { source, .. } | StreamError::Operation { source, .. } => source,
        }
    }
}

/// Result type for lazystream finalizers under the `Break` policy
pub type StreamResult<T> = Result<T, StreamError>;

/// A failure that has not been placed at an index yet
#[derive(Debug)]
pub(crate) enum Fault {
    Cycle(SharedError),
    Operation {
        operation: &'static str,
        item: String,
        source: SharedError,
    },
}

impl Fault {
    pub(crate) fn cycle<E: Into<BoxError>>(error: E) -> Self {
        Fault::Cycle(Arc::from(error.into()))
    }

    pub(crate) fn operation<E: Into<BoxError>>(operation: &'static str, item: String, error: E) -> Self {
        Fault::Operation {
            operation,
            item,
            source: Arc::from(error.into()),
        }
    }

    pub(crate) fn at(self, index: usize) -> StreamError {
        match self {
            Fault::Cycle(source) => StreamError::Cycle { index, source },
            Fault::Operation {
                operation,
                item,
                source,
            } => StreamError::Operation {
                operation,
                item,
                index,
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_message() {
        let error = Fault::operation("map", "3".to_string(), "boom").at(2);
        assert_eq!(
            error.to_string(),
            "Error occurred while performing map on 3 at index 2 in iterator: boom"
        );
        assert_eq!(error.index(), 2);
        assert_eq!(error.operation(), Some("map"));
        assert!(!error.is_cycle());
    }

    #[test]
    fn test_cycle_message() {
        let error = Fault::cycle("source closed").at(7);
        assert_eq!(
            error.to_string(),
            "Error occurred at item at index 7 in iterator: source closed"
        );
        assert!(error.is_cycle());
        assert_eq!(error.operation(), None);
        assert_eq!(error.cause().to_string(), "source closed");
    }

    #[test]
    fn test_source_chain() {
        let error = Fault::cycle("inner").at(0);
        let source = std::error::Error::source(&error).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("inner"));
    }
}
