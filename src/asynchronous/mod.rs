//! Asynchronous engine
//!
//! Same design as the synchronous [`Stream`](crate::Stream): operations are
//! queued, then applied one item at a time in source order while a finalizer
//! awaits the traversal. Every pull and every `*_async` operation is a
//! suspension point; nothing runs concurrently.
//!
//! ```
//! use lazystream::{source, AsyncStream};
//!
//! # tokio_test::block_on(async {
//! let doubled = AsyncStream::from_slice(&[1, 2, 3, 4])
//!     .filter(|x| x % 2 == 0)
//!     .map_async(|x| async move { x * 2 })
//!     .chain(source::from_iter(vec![100]))
//!     .collect()
//!     .await
//!     .unwrap();
//! assert_eq!(doubled, vec![4, 8, 100]);
//! # });
//! ```

pub mod core;
mod advanced;
mod utility;

pub use self::core::AsyncStream;
