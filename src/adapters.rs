//! Adapter state machines and their drivers
//!
//! An [`Adapter`] holds only adapter-local state (counters, lookahead, the
//! current inner sequence). It never pulls by itself: a driver asks it
//! whether to pull, pulls from the upstream traversal, and hands the item
//! over. [`Adapted`] drives it over an `Iterator`, [`drive`] over a
//! `futures` stream, so each adapter exists once for both engines.
//!
//! Upstream items are `Result<T, A>` where `Err` is an abort raised by the
//! upstream traversal. Drivers pass it downstream and stop.

use async_stream::stream;
use futures_util::stream::{BoxStream, StreamExt};

use crate::error::Fault;
use crate::operation::Step;

/// Decision of an adapter for the current pull
pub(crate) enum Gate<U, A> {
    Emit(Step<U, A>),
    Pull,
    Stop,
}

pub(crate) trait Adapter<T, A> {
    type Output;

    /// Called before every upstream pull; can emit buffered output or stop.
    fn before_pull(&mut self) -> Gate<Self::Output, A> {
        Gate::Pull
    }

    fn on_item(&mut self, item: T) -> Gate<Self::Output, A>;
}

pub(crate) struct Take {
    remaining: usize,
}

impl Take {
    pub(crate) fn new(n: usize) -> Self {
        Self { remaining: n }
    }
}

impl<T, A> Adapter<T, A> for Take {
    type Output = T;

    fn before_pull(&mut self) -> Gate<T, A> {
        if self.remaining == 0 {
            Gate::Stop
        } else {
            Gate::Pull
        }
    }

    fn on_item(&mut self, item: T) -> Gate<T, A> {
        self.remaining -= 1;
        Gate::Emit(Step::Success(item))
    }
}

pub(crate) struct Skip {
    remaining: usize,
}

impl Skip {
    pub(crate) fn new(n: usize) -> Self {
        Self { remaining: n }
    }
}

impl<T, A> Adapter<T, A> for Skip {
    type Output = T;

    fn on_item(&mut self, item: T) -> Gate<T, A> {
        if self.remaining > 0 {
            self.remaining -= 1;
            Gate::Pull
        } else {
            Gate::Emit(Step::Success(item))
        }
    }
}

pub(crate) struct StepBy {
    step: usize,
    // position modulo step
    phase: usize,
}

impl StepBy {
    /// Panics when `step` is zero.
    pub(crate) fn new(step: usize) -> Self {
        assert!(step != 0, "step_by requires a non-zero step");
        Self { step, phase: 0 }
    }
}

impl<T, A> Adapter<T, A> for StepBy {
    type Output = T;

    fn on_item(&mut self, item: T) -> Gate<T, A> {
        let hit = self.phase == 0;
        self.phase = (self.phase + 1) % self.step;
        if hit {
            Gate::Emit(Step::Success(item))
        } else {
            Gate::Pull
        }
    }
}

pub(crate) struct Enumerate {
    count: usize,
}

impl Enumerate {
    pub(crate) fn new() -> Self {
        Self { count: 0 }
    }
}

impl<T, A> Adapter<T, A> for Enumerate {
    type Output = (usize, T);

    fn on_item(&mut self, item: T) -> Gate<(usize, T), A> {
        let index = self.count;
        self.count += 1;
        Gate::Emit(Step::Success((index, item)))
    }
}

/// Separator between consecutive items, computed from the previous one
pub(crate) struct Intersperse<T, F> {
    separator: F,
    last: Option<T>,
    pending: Option<T>,
}

impl<T, F> Intersperse<T, F> {
    pub(crate) fn new(separator: F) -> Self {
        Self {
            separator,
            last: None,
            pending: None,
        }
    }
}

impl<T, A, F> Adapter<T, A> for Intersperse<T, F>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    type Output = T;

    fn before_pull(&mut self) -> Gate<T, A> {
        match self.pending.take() {
            Some(item) => Gate::Emit(Step::Success(item)),
            None => Gate::Pull,
        }
    }

    fn on_item(&mut self, item: T) -> Gate<T, A> {
        match self.last.replace(item.clone()) {
            None => Gate::Emit(Step::Success(item)),
            Some(previous) => {
                let separator = (self.separator)(&previous);
                self.pending = Some(item);
                Gate::Emit(Step::Success(separator))
            }
        }
    }
}

/// `f` maps an item to its inner sequence, or to a fault that surfaces as a
/// cycle error of the derived stream.
pub(crate) struct FlatMap<F, I> {
    f: F,
    current: Option<I>,
}

impl<F, I> FlatMap<F, I> {
    pub(crate) fn new(f: F) -> Self {
        Self { f, current: None }
    }
}

impl<T, A, F, I> Adapter<T, A> for FlatMap<F, I>
where
    F: FnMut(T) -> Result<I, Fault>,
    I: Iterator,
{
    type Output = I::Item;

    fn before_pull(&mut self) -> Gate<I::Item, A> {
        if let Some(inner) = &mut self.current {
            if let Some(item) = inner.next() {
                return Gate::Emit(Step::Success(item));
            }
            self.current = None;
        }
        Gate::Pull
    }

    fn on_item(&mut self, item: T) -> Gate<I::Item, A> {
        match (self.f)(item) {
            Ok(inner) => {
                self.current = Some(inner);
                Gate::Pull
            }
            Err(fault) => Gate::Emit(Step::Failed(fault)),
        }
    }
}

/// Yields inner values until the first `None`, then stops for good
pub(crate) struct Fuse;

impl<T, A> Adapter<Option<T>, A> for Fuse {
    type Output = T;

    fn on_item(&mut self, item: Option<T>) -> Gate<T, A> {
        match item {
            Some(value) => Gate::Emit(Step::Success(value)),
            None => Gate::Stop,
        }
    }
}

// ================================
// Synchronous drivers
// ================================

pub(crate) struct Adapted<I, D> {
    upstream: I,
    adapter: D,
    done: bool,
}

impl<I, D> Adapted<I, D> {
    pub(crate) fn new(upstream: I, adapter: D) -> Self {
        Self {
            upstream,
            adapter,
            done: false,
        }
    }
}

impl<I, D, T, A> Iterator for Adapted<I, D>
where
    I: Iterator<Item = Result<T, A>>,
    D: Adapter<T, A>,
{
    type Item = Step<D::Output, A>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.adapter.before_pull() {
                Gate::Emit(step) => return Some(step),
                Gate::Stop => break,
                Gate::Pull => {}
            }
            let gate = match self.upstream.next() {
                Some(Ok(item)) => self.adapter.on_item(item),
                Some(Err(abort)) => {
                    self.done = true;
                    return Some(Step::Aborted(abort));
                }
                None => Gate::Stop,
            };
            match gate {
                Gate::Emit(step) => return Some(step),
                Gate::Pull => {}
                Gate::Stop => break,
            }
        }
        self.done = true;
        None
    }
}

pub(crate) struct Chain<I, J> {
    first: Option<I>,
    second: J,
    done: bool,
}

impl<I, J> Chain<I, J> {
    pub(crate) fn new(first: I, second: J) -> Self {
        Self {
            first: Some(first),
            second,
            done: false,
        }
    }
}

/// `second` is a normalized source: its `Err` items are cycle faults.
impl<I, J, T, A> Iterator for Chain<I, J>
where
    I: Iterator<Item = Result<T, A>>,
    J: Iterator<Item = Result<T, Fault>>,
{
    type Item = Step<T, A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(first) = &mut self.first {
            match first.next() {
                Some(Ok(item)) => return Some(Step::Success(item)),
                Some(Err(abort)) => {
                    self.done = true;
                    return Some(Step::Aborted(abort));
                }
                None => self.first = None,
            }
        }
        self.second.next().map(|pulled| match pulled {
            Ok(item) => Step::Success(item),
            Err(fault) => Step::Failed(fault),
        })
    }
}

pub(crate) struct Zip<I, J> {
    left: I,
    right: J,
    done: bool,
}

impl<I, J> Zip<I, J> {
    pub(crate) fn new(left: I, right: J) -> Self {
        Self {
            left,
            right,
            done: false,
        }
    }
}

/// A fault on the `right` side drops the pair and is routed as a cycle error.
impl<I, J, T, U, A> Iterator for Zip<I, J>
where
    I: Iterator<Item = Result<T, A>>,
    J: Iterator<Item = Result<U, Fault>>,
{
    type Item = Step<(T, U), A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let left = match self.left.next() {
            Some(Ok(item)) => item,
            Some(Err(abort)) => {
                self.done = true;
                return Some(Step::Aborted(abort));
            }
            None => {
                self.done = true;
                return None;
            }
        };
        match self.right.next() {
            Some(Ok(right)) => Some(Step::Success((left, right))),
            Some(Err(fault)) => Some(Step::Failed(fault)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

// ================================
// Asynchronous drivers
// ================================

/// Async counterpart of [`Adapted`]
pub(crate) fn drive<'a, T, A, D>(
    mut upstream: BoxStream<'a, Result<T, A>>,
    mut adapter: D,
) -> BoxStream<'a, Step<D::Output, A>>
where
    T: Send + 'a,
    A: Send + 'a,
    D: Adapter<T, A> + Send + 'a,
    D::Output: Send + 'a,
{
    stream! {
        loop {
            match adapter.before_pull() {
                Gate::Emit(step) => {
                    yield step;
                    continue;
                }
                Gate::Stop => break,
                Gate::Pull => {}
            }
            match upstream.next().await {
                Some(Ok(item)) => match adapter.on_item(item) {
                    Gate::Emit(step) => yield step,
                    Gate::Pull => {}
                    Gate::Stop => break,
                },
                Some(Err(abort)) => {
                    yield Step::Aborted(abort);
                    break;
                }
                None => break,
            }
        }
    }
    .boxed()
}

/// `second` is a normalized source: its `Err` items are cycle faults.
pub(crate) fn chain<'a, T, A>(
    mut first: BoxStream<'a, Result<T, A>>,
    mut second: BoxStream<'a, Result<T, Fault>>,
) -> BoxStream<'a, Step<T, A>>
where
    T: Send + 'a,
    A: Send + 'a,
{
    stream! {
        while let Some(pulled) = first.next().await {
            match pulled {
                Ok(item) => yield Step::Success(item),
                Err(abort) => {
                    yield Step::Aborted(abort);
                    return;
                }
            }
        }
        while let Some(pulled) = second.next().await {
            match pulled {
                Ok(item) => yield Step::Success(item),
                Err(fault) => yield Step::Failed(fault),
            }
        }
    }
    .boxed()
}

/// A fault on the `right` side drops the pair and is routed as a cycle error.
pub(crate) fn zip<'a, T, U, A>(
    mut left: BoxStream<'a, Result<T, A>>,
    mut right: BoxStream<'a, Result<U, Fault>>,
) -> BoxStream<'a, Step<(T, U), A>>
where
    T: Send + 'a,
    U: Send + 'a,
    A: Send + 'a,
{
    stream! {
        while let Some(pulled) = left.next().await {
            let item = match pulled {
                Ok(item) => item,
                Err(abort) => {
                    yield Step::Aborted(abort);
                    return;
                }
            };
            match right.next().await {
                Some(Ok(other)) => yield Step::Success((item, other)),
                Some(Err(fault)) => yield Step::Failed(fault),
                None => return,
            }
        }
    }
    .boxed()
}
