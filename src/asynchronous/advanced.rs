//! Async adapters: take, skip, step_by, chain, intersperse, zip, enumerate,
//! flat_map, fuse
//!
//! Adapters await the upstream traversal and start a new stream with an
//! empty operation queue and the same error handler.

use crate::adapters::{self, Adapter, Enumerate, FlatMap, Fuse, Intersperse, Skip, StepBy, Take};
use crate::error::{BoxError, Fault};
use crate::handler::ErrorHandler;
use crate::source::AsyncSource;

use super::core::AsyncStream;

impl<'a, T: Send + 'a, H: ErrorHandler> AsyncStream<'a, T, H> {
    fn adapt<D>(self, adapter: D) -> AsyncStream<'a, D::Output, H>
    where
        D: Adapter<T, H::Abort> + Send + 'a,
        D::Output: Send + 'a,
    {
        let handler = self.handler().clone();
        AsyncStream::from_steps(adapters::drive(self.into_read(), adapter), handler)
    }

    pub fn take(self, n: usize) -> Self {
        self.adapt(Take::new(n))
    }

    pub fn skip(self, n: usize) -> Self {
        self.adapt(Skip::new(n))
    }

    /// Alias of [`skip`](Self::skip).
    pub fn drop(self, n: usize) -> Self {
        self.skip(n)
    }

    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn step_by(self, n: usize) -> Self {
        self.adapt(StepBy::new(n))
    }

    /// All remaining items, then the items of `other`. Failed pulls of
    /// `other` are cycle errors of the returned stream.
    pub fn chain(self, other: AsyncSource<'a, T>) -> Self {
        let handler = self.handler().clone();
        AsyncStream::from_steps(adapters::chain(self.into_read(), other.into_inner()), handler)
    }

    pub fn intersperse(self, separator: T) -> Self
    where
        T: Clone,
    {
        self.intersperse_with(move |_| separator.clone())
    }

    pub fn intersperse_with<F>(self, f: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> T + Send + 'a,
    {
        self.adapt(Intersperse::new(f))
    }

    /// Pairs awaited in lockstep, left side first; ends with the shorter side.
    pub fn zip<U: Send + 'a>(self, other: AsyncSource<'a, U>) -> AsyncStream<'a, (T, U), H> {
        let handler = self.handler().clone();
        AsyncStream::from_steps(adapters::zip(self.into_read(), other.into_inner()), handler)
    }

    pub fn enumerate(self) -> AsyncStream<'a, (usize, T), H> {
        self.adapt(Enumerate::new())
    }

    pub fn flat_map<I, F>(self, mut f: F) -> AsyncStream<'a, I::Item, H>
    where
        I: IntoIterator,
        I::IntoIter: Send + 'a,
        I::Item: Send + 'a,
        F: FnMut(T) -> I + Send + 'a,
    {
        self.adapt(FlatMap::new(move |item| Ok::<_, Fault>(f(item).into_iter())))
    }

    pub fn try_flat_map<I, E, F>(self, mut f: F) -> AsyncStream<'a, I::Item, H>
    where
        I: IntoIterator,
        I::IntoIter: Send + 'a,
        I::Item: Send + 'a,
        E: Into<BoxError> + 'a,
        F: FnMut(T) -> Result<I, E> + Send + 'a,
    {
        self.adapt(FlatMap::new(move |item| {
            f(item).map(IntoIterator::into_iter).map_err(Fault::cycle)
        }))
    }
}

impl<'a, T: Send + 'a, H: ErrorHandler> AsyncStream<'a, Option<T>, H> {
    /// Inner values up to the first `None`.
    pub fn fuse(self) -> AsyncStream<'a, T, H> {
        self.adapt(Fuse)
    }
}
