//! Async source adapters
//!
//! Every admissible input of the async engine is normalized into an
//! [`AsyncSource`]: a boxed `futures` stream of items, where an `Err` is a
//! failed pull (a cycle error once it reaches a traversal).
//!
//! The sync engine needs no counterpart: any `IntoIterator` is already a
//! pull source.

use async_stream::stream;
use futures_core::Stream;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::future::Future;

use crate::error::{BoxError, Fault};
use crate::operation::Step;

/// Normalized pull source of the async engine
pub struct AsyncSource<'a, T> {
    inner: BoxStream<'a, Result<T, Fault>>,
}

impl<'a, T: Send + 'a> AsyncSource<'a, T> {
    fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = Result<T, Fault>> + Send + 'a,
    {
        Self {
            inner: inner.boxed(),
        }
    }

    pub(crate) fn into_inner(self) -> BoxStream<'a, Result<T, Fault>> {
        self.inner
    }

    pub(crate) fn into_steps<A: Send + 'a>(self) -> BoxStream<'a, Step<T, A>> {
        self.inner
            .map(|pulled| match pulled {
                Ok(item) => Step::Success(item),
                Err(fault) => Step::Failed(fault),
            })
            .boxed()
    }
}

impl<'a, T> fmt::Debug for AsyncSource<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncSource").finish_non_exhaustive()
    }
}

/// Source over an owned iterable
pub fn from_iter<'a, I>(items: I) -> AsyncSource<'a, I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'a,
    I::Item: Send + 'a,
{
    AsyncSource::new(stream::iter(items).map(Ok))
}

/// Source over a defensive copy of `items`
///
/// The source never observes later changes to the slice's owner, and two
/// sources built from the same slice are independent.
pub fn from_slice<'a, T>(items: &[T]) -> AsyncSource<'a, T>
where
    T: Clone + Send + 'a,
{
    from_iter(items.to_vec())
}

pub fn from_stream<'a, S>(source: S) -> AsyncSource<'a, S::Item>
where
    S: Stream + Send + 'a,
    S::Item: Send + 'a,
{
    AsyncSource::new(source.map(Ok))
}

/// Source over a fallible iterable; each `Err` is a cycle error.
pub fn try_from_iter<'a, I, T, E>(items: I) -> AsyncSource<'a, T>
where
    I: IntoIterator<Item = Result<T, E>>,
    I::IntoIter: Send + 'a,
    T: Send + 'a,
    E: Into<BoxError> + Send + 'a,
{
    try_from_stream(stream::iter(items))
}

/// Source over a fallible stream; each `Err` is a cycle error.
pub fn try_from_stream<'a, S, T, E>(source: S) -> AsyncSource<'a, T>
where
    S: Stream<Item = Result<T, E>> + Send + 'a,
    T: Send + 'a,
    E: Into<BoxError> + Send + 'a,
{
    AsyncSource::new(source.map(|pulled| pulled.map_err(Fault::cycle)))
}

/// Source that awaits `poll()` until it resolves to `None`
///
/// A future that never resolves stalls the whole pipeline.
///
/// ```
/// use lazystream::{source, AsyncStream};
///
/// # tokio_test::block_on(async {
/// let mut next = 0;
/// let stream = AsyncStream::new(source::poll(move || {
///     next += 1;
///     let value = (next <= 3).then_some(next);
///     async move { value }
/// }));
/// assert_eq!(stream.collect().await.unwrap(), vec![1, 2, 3]);
/// # });
/// ```
pub fn poll<'a, T, F, Fut>(mut poll: F) -> AsyncSource<'a, T>
where
    T: Send + 'a,
    F: FnMut() -> Fut + Send + 'a,
    Fut: Future<Output = Option<T>> + Send + 'a,
{
    AsyncSource::new(stream! {
        while let Some(item) = poll().await {
            yield Ok::<T, Fault>(item);
        }
    })
}

/// Fallible polling source. An `Err` is a cycle error and polling goes on,
/// so under `Ignore` or `Settle` a poll that keeps failing never ends.
pub fn try_poll<'a, T, E, F, Fut>(mut poll: F) -> AsyncSource<'a, T>
where
    T: Send + 'a,
    E: Into<BoxError> + Send + 'a,
    F: FnMut() -> Fut + Send + 'a,
    Fut: Future<Output = Result<Option<T>, E>> + Send + 'a,
{
    AsyncSource::new(stream! {
        loop {
            match poll().await {
                Ok(Some(item)) => yield Ok(item),
                Ok(None) => break,
                Err(e) => yield Err(Fault::cycle(e)),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T: Send>(source: AsyncSource<'_, T>) -> Vec<Result<T, String>> {
        tokio_test::block_on(
            source
                .into_inner()
                .map(|pulled| pulled.map_err(|fault| fault.at(0).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_from_slice_copies() {
        let mut items = vec![1, 2];
        let source = from_slice(&items);
        items.push(3);
        assert_eq!(drain(source), vec![Ok(1), Ok(2)]);
    }

    #[test]
    fn test_try_poll_maps_errors_to_cycle_faults() {
        let mut calls = 0;
        let source = try_poll(move || {
            calls += 1;
            let result = match calls {
                1 => Ok(Some(10)),
                2 => Err("flaky"),
                3 => Ok(Some(30)),
                _ => Ok(None),
            };
            async move { result }
        });
        assert_eq!(
            drain(source),
            vec![
                Ok(10),
                Err("Error occurred at item at index 0 in iterator: flaky".to_string()),
                Ok(30)
            ]
        );
    }
}
