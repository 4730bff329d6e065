//! Stream construction, the operation queue and the traversal loop

use std::fmt;
use std::fmt::Debug;

use crate::error::{BoxError, Fault};
use crate::handler::{Break, ErrorHandler};
use crate::operation::{self, Applied, OperationKind, Step};
use crate::stream_configuration::Policy;
use crate::traversal::{Cursor, Flow};

/// Lazy synchronous stream
///
/// The source yields already-queued steps: every operation appended with
/// `map`, `filter`, ... wraps the source, so the queue runs in declaration
/// order when an item is pulled and never before.
pub struct Stream<'a, T, H: ErrorHandler = Break> {
    pub(super) source: Box<dyn Iterator<Item = Step<T, H::Abort>> + 'a>,
    pub(super) queue: Vec<OperationKind>,
    pub(super) cursor: Cursor<H>,
}

fn pulled<T, A, E: Into<BoxError>>(pulled: Result<T, E>) -> Step<T, A> {
    match pulled {
        Ok(item) => Step::Success(item),
        Err(e) => Step::Failed(Fault::cycle(e)),
    }
}

impl<'a, T: 'a> Stream<'a, T> {
    /// Stream over any iterable, failing fast on errors.
    ///
    /// Passing `&vec` borrows the items, passing `vec` moves them.
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::with_handler(source, Break)
    }

    /// Stream over a fallible iterable; each `Err` is a cycle error.
    pub fn try_new<I, E>(source: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: 'a,
        E: Into<BoxError> + 'a,
    {
        Self::try_with_handler(source, Break)
    }
}

impl<'a, T: 'a, H: ErrorHandler> Stream<'a, T, H> {
    pub fn with_handler<I>(source: I, handler: H) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::from_steps(source.into_iter().map(Step::Success), handler)
    }

    pub fn try_with_handler<I, E>(source: I, handler: H) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: 'a,
        E: Into<BoxError> + 'a,
    {
        Self::from_steps(source.into_iter().map(pulled::<T, H::Abort, E>), handler)
    }

    pub(crate) fn from_steps<I>(steps: I, handler: H) -> Self
    where
        I: Iterator<Item = Step<T, H::Abort>> + 'a,
    {
        Self {
            source: Box::new(steps),
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

    /// Operations queued on this stream, in declaration order
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

    fn push<U, F>(self, kind: OperationKind, mut op: F) -> Stream<'a, U, H>
    where
        U: 'a,
        F: FnMut(T) -> Applied<U> + 'a,
    {
        let Stream {
            source,
            mut queue,
            cursor,
        } = self;
        queue.push(kind);
        Stream {
            source: Box::new(source.map(move |step| step.apply(&mut op))),
            queue,
            cursor,
        }
    }

    pub fn map<U, F>(self, f: F) -> Stream<'a, U, H>
    where
        U: 'a,
        F: FnMut(T) -> U + 'a,
    {
        self.push(OperationKind::Map, operation::map(f))
    }

    /// `map` with a fallible function; an `Err` is an operation error.
    pub fn try_map<U, E, F>(self, f: F) -> Stream<'a, U, H>
    where
        T: Debug,
        U: 'a,
        E: Into<BoxError> + 'a,
        F: FnMut(T) -> Result<U, E> + 'a,
    {
        self.push(OperationKind::Map, operation::try_map(f))
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + 'a,
    {
        self.push(OperationKind::Filter, operation::filter(predicate))
    }

    pub fn try_filter<E, F>(self, predicate: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + 'a,
        F: FnMut(&T) -> Result<bool, E> + 'a,
    {
        self.push(OperationKind::Filter, operation::try_filter(predicate))
    }

    /// Run a side effect on every item that reaches this point (`forEach`).
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnMut(&T) + 'a,
    {
        self.push(OperationKind::Inspect, operation::inspect(f))
    }

    pub fn try_inspect<E, F>(self, f: F) -> Self
    where
        T: Debug,
        E: Into<BoxError> + 'a,
        F: FnMut(&T) -> Result<(), E> + 'a,
    {
        self.push(OperationKind::Inspect, operation::try_inspect(f))
    }

    pub fn filter_map<U, F>(self, f: F) -> Stream<'a, U, H>
    where
        U: 'a,
        F: FnMut(T) -> Option<U> + 'a,
    {
        self.push(OperationKind::FilterMap, operation::filter_map(f))
    }

    pub fn try_filter_map<U, E, F>(self, f: F) -> Stream<'a, U, H>
    where
        T: Debug,
        U: 'a,
        E: Into<BoxError> + 'a,
        F: FnMut(T) -> Result<Option<U>, E> + 'a,
    {
        self.push(OperationKind::FilterMap, operation::try_filter_map(f))
    }

    /// Pull the next surviving item. `Err` means the traversal aborted.
    pub(crate) fn pull(&mut self) -> Option<Result<T, H::Abort>> {
        while !self.cursor.is_exhausted() {
            let step = self.source.next();
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
    ///
    /// Items are pulled lazily; whatever is not pulled stays available to
    /// later adapters and finalizers on the same stream.
    pub fn read(&mut self) -> Read<'_, 'a, T, H> {
        Read { stream: self }
    }

    /// Derived stream that consumes from this one, leaving the rest in place.
    ///
    /// Adapters that look one item ahead (`intersperse`, `zip`) may pull an
    /// item they never yield when the derived stream stops early. That item
    /// is consumed and does not come back to this stream.
    ///
    /// ```
    /// use lazystream::Stream;
    ///
    /// let mut stream = Stream::new(1..=5);
    /// let head = stream.by_ref().take(2).collect().unwrap();
    /// assert_eq!(head, vec![1, 2]);
    /// assert_eq!(stream.collect().unwrap(), vec![3, 4, 5]);
    /// ```
    pub fn by_ref(&mut self) -> Stream<'_, T, H> {
        let handler = self.cursor.handler().clone();
        Stream::from_steps(self.read().map(Step::from_pull), handler)
    }
}

impl<'a, T, H: ErrorHandler> fmt::Debug for Stream<'a, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("policy", &self.cursor.handler().policy())
            .field("queue", &self.queue)
            .field("pulled", &self.cursor.index())
            .field("exhausted", &self.cursor.is_exhausted())
            .finish()
    }
}

/// Borrowing traversal returned by [`Stream::read`]
pub struct Read<'s, 'a, T, H: ErrorHandler> {
    stream: &'s mut Stream<'a, T, H>,
}

impl<'s, 'a, T: 'a, H: ErrorHandler> Iterator for Read<'s, 'a, T, H> {
    type Item = Result<T, H::Abort>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.pull()
    }
}

/// Owning traversal of a [`Stream`]
pub struct IntoIter<'a, T, H: ErrorHandler> {
    stream: Stream<'a, T, H>,
}

impl<'a, T: 'a, H: ErrorHandler> Iterator for IntoIter<'a, T, H> {
    type Item = Result<T, H::Abort>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.pull()
    }
}

impl<'a, T: 'a, H: ErrorHandler> IntoIterator for Stream<'a, T, H> {
    type Item = Result<T, H::Abort>;
    type IntoIter = IntoIter<'a, T, H>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { stream: self }
    }
}
