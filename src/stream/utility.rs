//! Finalizers: collect, count, nth, reduce, flat, any, all, find,
//! partition, ...
//!
//! Finalizers that can stop early (`nth`, `any`, `all`, `find`,
//! `find_index`, `includes`) borrow the stream, so it can be traversed
//! further from exactly where they stopped. The others consume it.

use std::fmt::Debug;

use crate::error::BoxError;
use crate::handler::ErrorHandler;
use crate::nested::Nested;
use crate::traversal::fold_routed;

use super::core::Stream;

impl<'a, T: 'a, H: ErrorHandler> Stream<'a, T, H> {
    fn compile<D>(&self, outcome: Result<D, H::Abort>) -> H::Compiled<D> {
        self.handler().compile(outcome)
    }

    /// Pull until `visit` returns `Some`; `position` counts yielded items.
    fn search<R>(&mut self, mut visit: impl FnMut(usize, T) -> Option<R>) -> Result<Option<R>, H::Abort> {
        let mut position = 0;
        while let Some(pulled) = self.pull() {
            if let Some(found) = visit(position, pulled?) {
                return Ok(Some(found));
            }
            position += 1;
        }
        Ok(None)
    }

    fn drain(&mut self) -> Result<Vec<T>, H::Abort> {
        self.read().collect()
    }

    pub fn collect(mut self) -> H::Compiled<Vec<T>> {
        let outcome = self.drain();
        self.compile(outcome)
    }

    pub fn count(mut self) -> H::Compiled<usize> {
        let outcome = self.read().try_fold(0usize, |count, pulled| pulled.map(|_| count + 1));
        self.compile(outcome)
    }

    /// Item at position `n` of the remaining traversal. Items up to and
    /// including it are consumed.
    pub fn nth(&mut self, n: usize) -> H::Compiled<Option<T>> {
        let outcome = self.search(|position, item| (position == n).then_some(item));
        self.compile(outcome)
    }

    pub fn first(&mut self) -> H::Compiled<Option<T>> {
        self.nth(0)
    }

    pub fn last(mut self) -> H::Compiled<Option<T>> {
        let outcome = self.read().try_fold(None, |_, pulled| pulled.map(Some));
        self.compile(outcome)
    }

    /// Left fold.
    pub fn reduce<B, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        F: FnMut(B, T) -> B,
    {
        let outcome = self
            .read()
            .try_fold(init, |acc, pulled| pulled.map(|item| op(acc, item)));
        self.compile(outcome)
    }

    /// Left fold with a fallible `op`. A failing step is a `reduce` operation
    /// error for that item; under `Ignore` and `Settle` the accumulator is
    /// kept.
    ///
    /// The error index is the item's position within the fold, not the
    /// traversal index of its pull.
    pub fn try_reduce<B, E, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        T: Debug,
        E: Into<BoxError>,
        F: FnMut(&B, T) -> Result<B, E>,
    {
        let handler = self.handler().clone();
        let outcome = self
            .read()
            .enumerate()
            .try_fold(init, |acc, (position, pulled)| {
                fold_routed(&handler, acc, position, pulled?, &mut op)
            });
        self.compile(outcome)
    }

    /// Right fold; materializes the remaining items first.
    pub fn reduce_right<B, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        F: FnMut(B, T) -> B,
    {
        let outcome = self
            .drain()
            .map(|items| items.into_iter().rev().fold(init, |acc, item| op(acc, item)));
        self.compile(outcome)
    }

    /// Right fold with a fallible `op`. Errors are indexed by the item's
    /// forward position within the fold, like [`try_reduce`](Self::try_reduce).
    pub fn try_reduce_right<B, E, F>(mut self, init: B, mut op: F) -> H::Compiled<B>
    where
        T: Debug,
        E: Into<BoxError>,
        F: FnMut(&B, T) -> Result<B, E>,
    {
        let handler = self.handler().clone();
        let outcome = self.drain().and_then(|items| {
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

    /// `true` at the first item matching `predicate`; the stream resumes
    /// right after it.
    pub fn any<F>(&mut self, mut predicate: F) -> H::Compiled<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .search(|_, item| predicate(&item).then_some(()))
            .map(|found| found.is_some());
        self.compile(outcome)
    }

    /// `false` at the first item failing `predicate`.
    pub fn all<F>(&mut self, mut predicate: F) -> H::Compiled<bool>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .search(|_, item| (!predicate(&item)).then_some(()))
            .map(|found| found.is_none());
        self.compile(outcome)
    }

    pub fn find<F>(&mut self, mut predicate: F) -> H::Compiled<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self.search(|_, item| predicate(&item).then_some(item));
        self.compile(outcome)
    }

    /// Position of the first match in the remaining traversal.
    pub fn find_index<F>(&mut self, mut predicate: F) -> H::Compiled<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self.search(|position, item| predicate(&item).then_some(position));
        self.compile(outcome)
    }

    pub fn find_last<F>(mut self, mut predicate: F) -> H::Compiled<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .drain()
            .map(|items| items.into_iter().rev().find(|item| predicate(item)));
        self.compile(outcome)
    }

    pub fn find_last_index<F>(mut self, mut predicate: F) -> H::Compiled<Option<usize>>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .drain()
            .map(|items| items.iter().rposition(|item| predicate(item)));
        self.compile(outcome)
    }

    pub fn includes(&mut self, value: &T) -> H::Compiled<bool>
    where
        T: PartialEq,
    {
        self.any(|item| item == value)
    }

    /// Split into `(matching, rest)` in one pass, keeping relative order.
    pub fn partition<F>(mut self, mut predicate: F) -> H::Compiled<(Vec<T>, Vec<T>)>
    where
        F: FnMut(&T) -> bool,
    {
        let outcome = self
            .read()
            .try_fold((Vec::new(), Vec::new()), |(mut yes, mut no), pulled| {
                let item = pulled?;
                if predicate(&item) {
                    yes.push(item);
                } else {
                    no.push(item);
                }
                Ok((yes, no))
            });
        self.compile(outcome)
    }
}

impl<'a, T, H> Stream<'a, T, H>
where
    T: IntoIterator + 'a,
    H: ErrorHandler,
{
    /// Concatenate the items' own sequences, one level deep.
    pub fn flat(mut self) -> H::Compiled<Vec<T::Item>> {
        let outcome = self.read().try_fold(Vec::<T::Item>::new(), |mut out, pulled| {
            out.extend(pulled?);
            Ok(out)
        });
        self.compile(outcome)
    }
}

impl<'a, T: 'a, H: ErrorHandler> Stream<'a, Nested<T>, H> {
    /// Flatten nested lists up to `depth` levels.
    pub fn flat_depth(mut self, depth: usize) -> H::Compiled<Vec<Nested<T>>> {
        let outcome = self.read().try_fold(Vec::new(), |mut out, pulled| {
            pulled?.flatten_into(depth, &mut out);
            Ok(out)
        });
        self.compile(outcome)
    }
}
