//! Lazy, pull-based streams
//!
//! A stream wraps a source and a queue of per-item operations. Nothing runs
//! until a finalizer or an adapter pulls; each pulled item then goes through
//! the whole queue before the next one is pulled. Failures are routed to the
//! stream's [`ErrorHandler`], which decides whether the traversal stops
//! ([`Break`]), drops the item ([`Ignore`]) or records the error next to the
//! data ([`Settle`]).
//!
//! [`Stream`] pulls from any `IntoIterator`; [`AsyncStream`] awaits a
//! normalized [`AsyncSource`].

pub mod error;
pub mod handler;
pub mod stream_configuration;
pub mod operation;
pub mod source;
pub mod nested;

pub mod stream;
pub mod asynchronous;

mod adapters;
mod traversal;

pub use asynchronous::AsyncStream;
pub use error::{BoxError, StreamError, StreamResult};
pub use handler::{Break, ErrorHandler, Ignore, Settle, Settled};
pub use nested::Nested;
pub use operation::OperationKind;
pub use source::AsyncSource;
pub use stream::Stream;
pub use stream_configuration::Policy;
