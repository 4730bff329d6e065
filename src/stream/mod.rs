//! Synchronous engine
//!
//! A [`Stream`] records operations without running them, then applies them
//! item by item while a finalizer (or `read`) pulls from its source.
//!
//! ```
//! use lazystream::Stream;
//!
//! let evens = Stream::new(1..)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * 10)
//!     .take(3)
//!     .collect()
//!     .unwrap();
//! assert_eq!(evens, vec![20, 40, 60]);
//! ```

pub mod core;
mod advanced;
mod utility;

pub use self::core::{IntoIter, Read, Stream};
