//! AsyncStream construction, the operation queue and the traversal loop

use async_stream::stream;
use futures_core::Stream;
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::{BoxStream, StreamExt};
use std::fmt;
use std::fmt::Debug;
use std::future::Future;

use crate::error::{BoxError, Fault};
use crate::handler::{Break, ErrorHandler};
use crate::operation::{self, render, Applied, OperationKind, Step};
use crate::source::{self, AsyncSource};
use crate::stream_configuration::Policy;
use crate::traversal::{Cursor, Flow};

/// Lazy asynchronous stream
pub struct AsyncStream<'a, T, H: ErrorHandler = Break> {
    pub(super) source: BoxStream<'a, Step<T, H::Abort>>,
    pub(super) queue: Vec<OperationKind>,
    pub(super) cursor: Cursor<H>,
}

impl<'a, T: Send + 'a> AsyncStream<'a, T> {
    /// Stream over a normalized source, failing fast on errors.
    pub fn new(source: AsyncSource<'a, T>) -> Self {
        Self::with_handler(source, Break)
    }

    /// Stream over a defensive copy of `items`.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self::new(source::from_slice(items))
    }

    pub fn from_stream<S>(items: S) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
    {
        Self::new(source::from_stream(items))
    }

    /// Stream that awaits `poll()` until it resolves to `None`.
    pub fn poll<F, Fut>(poll: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Option<T>> + Send + 'a,
    {
        Self::new(source::poll(poll))
    }

    /// Stream over a fallible stream; each `Err` is a cycle error.
    pub fn try_from_stream<S, E>(items: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'a,
        E: Into<BoxError> + Send + 'a,
    {
        Self::new(source::try_from_stream(items))
    }

    pub fn try_poll<F, Fut, E>(poll: F) -> Self
    where
        E: Into<BoxError> + Send + 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'a,
    {
        Self::new(source::try_poll(poll))
    }
}

impl<'a, T: Send + 'a, H: ErrorHandler> AsyncStream<'a, T, H> {
    pub fn with_handler(source: AsyncSource<'a, T>, handler: H) -> Self {
        Self::from_steps(source.into_steps(), handler)
    }

    pub(crate) fn from_steps(steps: BoxStream<'a, Step<T, H::Abort>>, handler: H) -> Self {
        Self {
            source: steps,
            queue: Vec::new(),
            cursor: Cursor::new(handler),
        }
    }

    pub fn handler(&self) -> &H {
        self.cursor.handler()
    }

    pub fn policy(&self) -> Policy {
        self.cursor.handler().policy()
    }

    pub fn pending_operations(&self) -> &[OperationKind] {
        &self.queue
    }

    /// Number of items pulled from the source so far
    pub fn pulled(&self) -> usize {
        self.cursor.index()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    fn push<U, F>(self, kind: OperationKind, mut op: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> Applied<U> + Send + 'a,
    {
        let AsyncStream {
            source,
            mut queue,
            cursor,
        } = self;
        queue.push(kind);
        AsyncStream {
            source: source.map(move |step| step.apply(&mut op)).boxed(),
            queue,
            cursor,
        }
    }

    fn push_async<U, F>(self, kind: OperationKind, mut op: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> BoxFuture<'a, Applied<U>> + Send + 'a,
    {
        let AsyncStream {
            source,
            mut queue,
            cursor,
        } = self;
        queue.push(kind);
        let source = source.then(move |step| match step.split() {
            Ok(item) => op(item).map(Step::from_applied).left_future(),
            Err(step) => future::ready(step).right_future(),
        });
        AsyncStream {
            source: source.boxed(),
            queue,
            cursor,
        }
    }

    pub fn map<U, F>(self, f: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> U + Send + 'a,
    {
        self.push(OperationKind::Map, operation::map(f))
    }

    pub fn try_map<U, E, F>(self, f: F) -> AsyncStream<'a, U, H>
    where
        T: Debug,
        U: Send + 'a,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(T) -> Result<U, E> + Send + 'a,
    {
        self.push(OperationKind::Map, operation::try_map(f))
    }

    pub fn map_async<U, F, Fut>(self, mut f: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = U> + Send + 'a,
    {
        self.push_async(OperationKind::Map, move |item| {
            f(item).map(|value| Ok(Some(value))).boxed()
        })
    }

    pub fn try_map_async<U, E, F, Fut>(self, mut f: F) -> AsyncStream<'a, U, H>
    where
        T: Debug,
        U: Send + 'a,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = Result<U, E>> + Send + 'a,
    {
        self.push_async(OperationKind::Map, move |item| {
            let shown = render(&item);
            f(item)
                .map(move |result| {
                    result
                        .map(Some)
                        .map_err(|e| Fault::operation(OperationKind::Map.name(), shown, e))
                })
                .boxed()
        })
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + Send + 'a,
    {
        self.push(OperationKind::Filter, operation::filter(predicate))
    }

    pub fn try_filter<E, F>(self, predicate: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(&T) -> Result<bool, E> + Send + 'a,
    {
        self.push(OperationKind::Filter, operation::try_filter(predicate))
    }

    pub fn filter_async<F, Fut>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = bool> + Send + 'a,
    {
        self.push_async(OperationKind::Filter, move |item| {
            let verdict = predicate(&item);
            async move { Ok::<_, Fault>(verdict.await.then_some(item)) }.boxed()
        })
    }

    pub fn try_filter_async<E, F, Fut>(self, mut predicate: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = Result<bool, E>> + Send + 'a,
    {
        self.push_async(OperationKind::Filter, move |item| {
            let verdict = predicate(&item);
            async move {
                match verdict.await {
                    Ok(keep) => Ok(keep.then_some(item)),
                    Err(e) => Err(Fault::operation(OperationKind::Filter.name(), render(&item), e)),
                }
            }
            .boxed()
        })
    }

    /// Run a side effect on every item that reaches this point (`forEach`).
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnMut(&T) + Send + 'a,
    {
        self.push(OperationKind::Inspect, operation::inspect(f))
    }

    pub fn try_inspect<E, F>(self, f: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(&T) -> Result<(), E> + Send + 'a,
    {
        self.push(OperationKind::Inspect, operation::try_inspect(f))
    }

    pub fn inspect_async<F, Fut>(self, mut f: F) -> Self
    where
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = ()> + Send + 'a,
    {
        self.push_async(OperationKind::Inspect, move |item| {
            let effect = f(&item);
            async move {
                effect.await;
                Ok::<_, Fault>(Some(item))
            }
            .boxed()
        })
    }

    pub fn try_inspect_async<E, F, Fut>(self, mut f: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(&T) -> Fut + Send + 'a,
        Fut: Future<Output = Result<(), E>> + Send + 'a,
    {
        self.push_async(OperationKind::Inspect, move |item| {
            let effect = f(&item);
            async move {
                match effect.await {
                    Ok(()) => Ok(Some(item)),
                    Err(e) => Err(Fault::operation(OperationKind::Inspect.name(), render(&item), e)),
                }
            }
            .boxed()
        })
    }

    pub fn filter_map<U, F>(self, f: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> Option<U> + Send + 'a,
    {
        self.push(OperationKind::FilterMap, operation::filter_map(f))
    }

    pub fn try_filter_map<U, E, F>(self, f: F) -> AsyncStream<'a, U, H>
    where
        T: Debug,
        U: Send + 'a,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(T) -> Result<Option<U>, E> + Send + 'a,
    {
        self.push(OperationKind::FilterMap, operation::try_filter_map(f))
    }

    pub fn filter_map_async<U, F, Fut>(self, mut f: F) -> AsyncStream<'a, U, H>
    where
        U: Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = Option<U>> + Send + 'a,
    {
        self.push_async(OperationKind::FilterMap, move |item| f(item).map(Ok).boxed())
    }

    pub fn try_filter_map_async<U, E, F, Fut>(self, mut f: F) -> AsyncStream<'a, U, H>
    where
        T: Debug,
        U: Send + 'a,
        E: Into<BoxError> + Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = Result<Option<U>, E>> + Send + 'a,
    {
        self.push_async(OperationKind::FilterMap, move |item| {
            let shown = render(&item);
            f(item)
                .map(move |result| {
                    result.map_err(|e| Fault::operation(OperationKind::FilterMap.name(), shown, e))
                })
                .boxed()
        })
    }

    /// Pull the next surviving item. `Err` means the traversal aborted.
    pub(crate) async fn pull(&mut self) -> Option<Result<T, H::Abort>> {
        while !self.cursor.is_exhausted() {
            let step = self.source.next().await;
            match self.cursor.route(step) {
                Flow::Yield(item) => return Some(Ok(item)),
                Flow::Continue => {}
                Flow::Abort(abort) => return Some(Err(abort)),
                Flow::Exhausted => return None,
            }
        }
        None
    }

    /// Traverse without consuming the stream.
    pub fn read(&mut self) -> BoxStream<'_, Result<T, H::Abort>> {
        let this = self;
        stream! {
            while let Some(pulled) = this.pull().await {
                yield pulled;
            }
        }
        .boxed()
    }

    /// Owning traversal as a `futures` stream.
    pub fn into_read(self) -> BoxStream<'a, Result<T, H::Abort>> {
        let mut this = self;
        stream! {
            while let Some(pulled) = this.pull().await {
                yield pulled;
            }
        }
        .boxed()
    }

    /// Derived stream that consumes from this one, leaving the rest in place.
    ///
    /// Adapters that look one item ahead (`intersperse`, `zip`) may pull an
    /// item they never yield when the derived stream stops early. That item
    /// is consumed and does not come back to this stream.
    pub fn by_ref(&mut self) -> AsyncStream<'_, T, H> {
        let handler = self.cursor.handler().clone();
        AsyncStream::from_steps(self.read().map(Step::from_pull).boxed(), handler)
    }
}

impl<'a, T, H: ErrorHandler> fmt::Debug for AsyncStream<'a, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncStream")
            .field("policy", &self.cursor.handler().policy())
            .field("queue", &self.queue)
            .field("pulled", &self.cursor.index())
            .field("exhausted", &self.cursor.is_exhausted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Settle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_operations_are_deferred() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut stream = AsyncStream::from_slice(&[1, 2, 3]).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(stream.read().next().await.map(Result::unwrap), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_and_sync_operations_interleave_in_order() {
        let out = AsyncStream::from_slice(&[1, 2, 3, 4, 5, 6])
            .filter_async(|x| {
                let keep = x % 2 == 0;
                async move { keep }
            })
            .map(|x| x + 1)
            .filter_map_async(|x| async move { (x != 5).then_some(x * 10) })
            .collect()
            .await
            .unwrap();
        assert_eq!(out, vec![30, 70]);
    }

    #[tokio::test]
    async fn test_try_map_async_error_context() {
        let settle = Settle::new();
        let settled = AsyncStream::with_handler(source::from_iter(vec!["1", "x", "3"]), settle)
            .try_map_async(|s| async move { s.parse::<i32>() })
            .collect()
            .await;
        assert_eq!(settled.data, vec![1, 3]);
        assert_eq!(
            settled.errors[0].to_string(),
            "Error occurred while performing map on \"x\" at index 1 in iterator: invalid digit found in string"
        );
    }

    #[tokio::test]
    async fn test_pending_operations() {
        let stream = AsyncStream::from_slice(&[1])
            .map_async(|x| async move { x })
            .inspect(|_| {});
        assert_eq!(
            stream.pending_operations(),
            &[OperationKind::Map, OperationKind::Inspect]
        );
    }
}
