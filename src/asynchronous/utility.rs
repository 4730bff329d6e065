//! Async finalizers
//!
//! Same contract as the synchronous finalizers: the short-circuiting ones
//! borrow the stream and leave it positioned right after the deciding item.

use std::fmt::Debug;
use std::future::Future;

use crate::error::BoxError;
use crate::handler::ErrorHandler;
use crate::nested::Nested;
use crate::traversal::fold_routed;

use super::core::AsyncStream;

impl<'a, T: Send + 'a, H: ErrorHandler> AsyncStream<'a, T, H> {
    fn compile<D>(&self, outcome: Result<D, H::Abort>) -> H::Compiled<D> {
        self.handler().compile(outcome)
    }

    /// Fold every remaining item; `position` counts yielded items.
    async fn fold<B>(
        &mut self,
        init: B,
        mut step: impl FnMut(B, usize, T) -> Result<B, H::Abort>,
    ) -> Result<B, H::Abort> {
        let mut acc = init;
        let mut position = 0;
        while let Some(pulled) = self.pull().await {
            acc = step(acc, position, pulled?)?;
            position += 1;
        }
        Ok(acc)
    }

    async fn search<R>(&mut self, mut visit: impl FnMut(usize, T) -> Option<R>) -> Result<Option<R>, H::Abort> {
        let mut position = 0;
        while let Some(pulled) = self.pull().await {
            if let Some(found) = visit(position, pulled?) {
                return Ok(Some(found));
            }
            position += 1;
        }
        Ok(None)
    }

    async fn drain(&mut self) -> Result<Vec<T>, H::Abort> {
        self.fold(Vec::new(), |mut out, _, item| {
            out.push(item);
            Ok(out)
        })
        .await
    }

    pub async fn collect(mut self) -> H::Compiled<Vec<T>> {
        let outcome = self.drain().await;
        self.compile(outcome)
    }

    pub async fn count(mut self) -> H::Compiled<usize> {
        let outcome = self.fold(0usize, |count, _, _| Ok(count + 1)).await;
        self.compile(outcome)
    }

    pub async fn nth(&mut self, n: usize) -> H::Compiled<Option<T>> {
        let outcome = self.search(|position, item| (position == n).then_some(item)).await;
        self.compile(outcome)
    }

    pub async fn first(&mut self) -> H::Compiled<Option<T>> {
        self.nth(0).await
    }

    pub async fn last(mut self) -> H::Compiled<Option<T>> {
        let outcome = self.fold(None, |_, _, item| Ok(Some(item))).await;
        self.compile(outcome)
    }

    pub async fn reduce<B, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        F: FnMut(B, T) -> B,
    {
        let outcome = self.fold(init, |acc, _, item| Ok(op(acc, item))).await;
        self.compile(outcome)
    }

    /// Left fold with an async `op`, awaited once per item in order.
    pub async fn reduce_async<B, F, Fut>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        F: FnMut(B, T) -> Fut,
        Fut: Future<Output = B>,
    {
        let mut acc = init;
        let outcome = loop {
            match self.pull().await {
                Some(Ok(item)) => acc = op(acc, item).await,
                Some(Err(abort)) => break Err(abort),
                None => break Ok(acc),
            }
        };
        self.compile(outcome)
    }

    /// Left fold with a fallible `op`. The error index is the item's position
    /// within the fold, not the traversal index of its pull.
    pub async fn try_reduce<B, E, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        T: Debug,
        E: Into<BoxError>,
        F: FnMut(&B, T) -> Result<B, E>,
    {
        let handler = self.handler().clone();
        let outcome = self
            .fold(init, |acc, position, item| {
                fold_routed(&handler, acc, position, item, &mut op)
            })
            .await;
        self.compile(outcome)
    }

    pub async fn reduce_right<B, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        F: FnMut(B, T) -> B,
    {
        let outcome = self
            .drain()
            .await
            .map(|items| items.into_iter().rev().fold(init, |acc, item| op(acc, item)));
        self.compile(outcome)
    }

    /// Right fold with a fallible `op`, indexed like
    /// [`try_reduce`](Self::try_reduce).
    pub async fn try_reduce_right<B, E, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        T: Debug,
        E: Into<BoxError>,
        F: FnMut(&B, T) -> Result<B, E>,
    {
        let handler = self.handler().clone();
        let outcome = self.drain().await.and_then(|items| {
            items
                .into_iter()
                .enumerate()
                .rev()
                .try_fold(init, |acc, (position, item)| {
                    fold_routed(&handler, acc, position, item, &mut op)
                })
        });
        self.compile(outcome)
    }

    pub async fn any<F>(&mut self, mut predicate: F) -> H::Compiled<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .search(|_, item| predicate(&item).then_some(()))
            .await
            .map(|found| found.is_some());
        self.compile(outcome)
    }

    pub async fn all<F>(&mut self, mut predicate: F) -> H::Compiled<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .search(|_, item| (!predicate(&item)).then_some(()))
            .await
            .map(|found| found.is_none());
        self.compile(outcome)
    }

    pub async fn find<F>(&mut self, mut predicate: F) -> H::Compiled<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self.search(|_, item| predicate(&item).then_some(item)).await;
        self.compile(outcome)
    }

    pub async fn find_index<F>(&mut self, mut predicate: F) -> H::Compiled<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .search(|position, item| predicate(&item).then_some(position))
            .await;
        self.compile(outcome)
    }

    pub async fn find_last<F>(mut self, mut predicate: F) -> H::Compiled<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .drain()
            .await
            .map(|items| items.into_iter().rev().find(|item| predicate(item)));
        self.compile(outcome)
    }

    pub async fn find_last_index<F>(mut self, mut predicate: F) -> H::Compiled<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .drain()
            .await
            .map(|items| items.iter().rposition(|item| predicate(item)));
        self.compile(outcome)
    }

    pub async fn includes(&mut self, value: &T) -> H::Compiled<bool>
    where
        T: PartialEq,
    {
        self.any(|item| item == value).await
    }

    pub async fn partition<F>(mut self, mut predicate: F) -> H::Compiled<(Vec<T>, Vec<T>)>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .fold((Vec::new(), Vec::new()), |(mut yes, mut no), _, item| {
                if predicate(&item) {
                    yes.push(item);
                } else {
                    no.push(item);
                }
                Ok((yes, no))
            })
            .await;
        self.compile(outcome)
    }
}

impl<'a, T, H> AsyncStream<'a, T, H>
where
    T: IntoIterator + Send + 'a,
    H: ErrorHandler,
{
    pub async fn flat(mut self) -> H::Compiled<Vec<T::Item>> {
        let outcome = self
            .fold(Vec::<T::Item>::new(), |mut out, _, item| {
                out.extend(item);
                Ok(out)
            })
            .await;
        self.compile(outcome)
    }
}

impl<'a, T: Send + 'a, H: ErrorHandler> AsyncStream<'a, Nested<T>, H> {
    pub async fn flat_depth(mut self, depth: usize) -> H::Compiled<Vec<Nested<T>>> {
        let outcome = self
            .fold(Vec::new(), |mut out, _, item| {
                item.flatten_into(depth, &mut out);
                Ok(out)
            })
            .await;
        self.compile(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::handler::{Ignore, Settle};
    use crate::source;
    use crate::AsyncStream;

    #[tokio::test]
    async fn test_find_resumes_after_match() {
        let mut stream = AsyncStream::from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(stream.find(|x| *x > 2).await.unwrap(), Some(3));
        assert_eq!(stream.collect().await.unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_reduce_async_in_order() {
        let joined = AsyncStream::with_handler(source::from_iter(vec!["a", "b", "c"]), Ignore)
            .reduce_async(String::new(), |acc, s| async move { format!("{}{}", acc, s) })
            .await;
        assert_eq!(joined, "abc");
    }

    #[tokio::test]
    async fn test_try_reduce_break_aborts_with_position() {
        let error = AsyncStream::from_slice(&[1, 2, 3])
            .try_reduce(0, |acc, x| if x == 3 { Err("three") } else { Ok(acc + x) })
            .await
            .unwrap_err();
        assert_eq!(error.index(), 2);
        assert_eq!(error.operation(), Some("reduce"));
    }

    #[tokio::test]
    async fn test_partition_settles_errors() {
        let settled = AsyncStream::with_handler(source::from_iter(1..=6), Settle::new())
            .try_filter(|x| if *x == 4 { Err("four") } else { Ok(true) })
            .partition(|x| x % 2 == 0)
            .await;
        assert_eq!(settled.data, (vec![2, 6], vec![1, 3, 5]));
        assert_eq!(settled.errors.len(), 1);
    }
}
