//! Iterator adapters: take, skip, step_by, chain, intersperse, zip,
//! enumerate, flat_map, fuse
//!
//! Each adapter consumes the stream's traversal and starts a new stream with
//! an empty operation queue and the same error handler.

use crate::adapters::{Adapted, Adapter, Chain, Enumerate, FlatMap, Fuse, Intersperse, Skip, StepBy, Take, Zip};
use crate::error::{BoxError, Fault};
use crate::handler::ErrorHandler;

use super::core::Stream;

impl<'a, T: 'a, H: ErrorHandler> Stream<'a, T, H> {
    fn adapt<D>(self, adapter: D) -> Stream<'a, D::Output, H>
    where
        D: Adapter<T, H::Abort> + 'a,
        D::Output: 'a,
    {
        let handler = self.handler().clone();
        Stream::from_steps(Adapted::new(self.into_iter(), adapter), handler)
    }

    /// At most the first `n` items. Never pulls past the `n`th.
    pub fn take(self, n: usize) -> Self {
        self.adapt(Take::new(n))
    }

    /// Discard the first `n` items.
    pub fn skip(self, n: usize) -> Self {
        self.adapt(Skip::new(n))
    }

    /// Alias of [`skip`](Self::skip).
    pub fn drop(self, n: usize) -> Self {
        self.skip(n)
    }

    /// Items at positions `0, n, 2n, ...` of this stream's output.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn step_by(self, n: usize) -> Self {
        self.adapt(StepBy::new(n))
    }

    /// All remaining items, then all items of `other`.
    pub fn chain<I>(self, other: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        let other = other.into_iter().map(Ok::<T, Fault>);
        let handler = self.handler().clone();
        Stream::from_steps(Chain::new(self.into_iter(), other), handler)
    }

    /// `chain` with a fallible `other`; each `Err` is a cycle error of the
    /// returned stream.
    pub fn try_chain<I, E>(self, other: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: 'a,
        E: Into<BoxError> + 'a,
    {
        let other = other.into_iter().map(|pulled| pulled.map_err(Fault::cycle));
        let handler = self.handler().clone();
        Stream::from_steps(Chain::new(self.into_iter(), other), handler)
    }

    /// Put a clone of `separator` between consecutive items.
    pub fn intersperse(self, separator: T) -> Self
    where
        T: Clone,
    {
        self.intersperse_with(move |_| separator.clone())
    }

    /// Put `f(previous)` between consecutive items; `f` only runs when a next
    /// item exists.
    pub fn intersperse_with<F>(self, f: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> T + 'a,
    {
        self.adapt(Intersperse::new(f))
    }

    /// Pairs pulled in lockstep; ends with the shorter side.
    pub fn zip<I>(self, other: I) -> Stream<'a, (T, I::Item), H>
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: 'a,
    {
        let other = other.into_iter().map(Ok::<I::Item, Fault>);
        let handler = self.handler().clone();
        Stream::from_steps(Zip::new(self.into_iter(), other), handler)
    }

    /// `zip` with a fallible `other`. An `Err` on the right drops that pair
    /// and is a cycle error of the returned stream.
    pub fn try_zip<I, U, E>(self, other: I) -> Stream<'a, (T, U), H>
    where
        I: IntoIterator<Item = Result<U, E>>,
        I::IntoIter: 'a,
        U: 'a,
        E: Into<BoxError> + 'a,
    {
        let other = other.into_iter().map(|pulled| pulled.map_err(Fault::cycle));
        let handler = self.handler().clone();
        Stream::from_steps(Zip::new(self.into_iter(), other), handler)
    }

    pub fn enumerate(self) -> Stream<'a, (usize, T), H> {
        self.adapt(Enumerate::new())
    }

    pub fn flat_map<I, F>(self, mut f: F) -> Stream<'a, I::Item, H>
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: 'a,
        F: FnMut(T) -> I + 'a,
    {
        self.adapt(FlatMap::new(move |item| Ok::<_, Fault>(f(item).into_iter())))
    }

    /// `flat_map` with a fallible function. An `Err` is a cycle error of the
    /// returned stream.
    pub fn try_flat_map<I, E, F>(self, mut f: F) -> Stream<'a, I::Item, H>
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: 'a,
        E: Into<BoxError>,
        F: FnMut(T) -> Result<I, E> + 'a,
    {
        self.adapt(FlatMap::new(move |item| {
            f(item).map(IntoIterator::into_iter).map_err(Fault::cycle)
        }))
    }
}

impl<'a, T: 'a, H: ErrorHandler> Stream<'a, Option<T>, H> {
    /// Inner values up to the first `None`; nothing after it, ever.
    pub fn fuse(self) -> Stream<'a, T, H> {
        self.adapt(Fuse)
    }
}
