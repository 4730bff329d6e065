//! Deferred per-item operations
//!
//! Every queued operation is normalized into one shape, a function from an
//! item to `Result<Option<U>, Fault>`: `Some` passes the item on, `None`
//! drops it and `Err` reports a failure for it. The sync and async engines
//! both build their queues out of these.

use std::fmt;
use std::fmt::Debug;

use crate::error::{BoxError, Fault};

/// Kind of a queued operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Map,
    Filter,
    /// Side-effecting pass-through (`forEach`)
    Inspect,
    FilterMap,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Map => "map",
            OperationKind::Filter => "filter",
            OperationKind::Inspect => "inspect",
            OperationKind::FilterMap => "filter_map",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of running one operation on one item
pub(crate) type Applied<U> = Result<Option<U>, Fault>;

/// State of one pulled item on its way through the queue
#[derive(Debug)]
pub(crate) enum Step<T, A> {
    Success(T),
    Filtered,
    Failed(Fault),
    /// Abort raised by an upstream traversal, passed through untouched
    Aborted(A),
}

impl<T, A> Step<T, A> {
    pub(crate) fn from_pull(pulled: Result<T, A>) -> Self {
        match pulled {
            Ok(item) => Step::Success(item),
            Err(abort) => Step::Aborted(abort),
        }
    }

    pub(crate) fn from_applied(applied: Applied<T>) -> Self {
        match applied {
            Ok(Some(item)) => Step::Success(item),
            Ok(None) => Step::Filtered,
            Err(fault) => Step::Failed(fault),
        }
    }

    /// Take the item out, or carry any other state over to a new item type.
    pub(crate) fn split<U>(self) -> Result<T, Step<U, A>> {
        match self {
            Step::Success(item) => Ok(item),
            Step::Filtered => Err(Step::Filtered),
            Step::Failed(fault) => Err(Step::Failed(fault)),
            Step::Aborted(abort) => Err(Step::Aborted(abort)),
        }
    }

    pub(crate) fn apply<U>(self, op: impl FnOnce(T) -> Applied<U>) -> Step<U, A> {
        match self.split() {
            Ok(item) => Step::from_applied(op(item)),
            Err(step) => step,
        }
    }
}

pub(crate) fn render<T: Debug>(item: &T) -> String {
    format!("{:?}", item)
}

pub(crate) fn map<T, U>(mut f: impl FnMut(T) -> U) -> impl FnMut(T) -> Applied<U> {
    move |item| Ok(Some(f(item)))
}

// The item is moved into `f`, so it is rendered up front for the error context.
pub(crate) fn try_map<T, U, E>(mut f: impl FnMut(T) -> Result<U, E>) -> impl FnMut(T) -> Applied<U>
where
    T: Debug,
    E: Into<BoxError>,
{
    move |item| {
        let shown = render(&item);
        f(item)
            .map(Some)
            .map_err(|e| Fault::operation(OperationKind::Map.name(), shown, e))
    }
}

pub(crate) fn filter<T>(mut predicate: impl FnMut(&T) -> bool) -> impl FnMut(T) -> Applied<T> {
    move |item| Ok(predicate(&item).then_some(item))
}

pub(crate) fn try_filter<T, E>(
    mut predicate: impl FnMut(&T) -> Result<bool, E>,
) -> impl FnMut(T) -> Applied<T>
where
    T: Debug,
    E: Into<BoxError>,
{
    move |item| match predicate(&item) {
        Ok(keep) => Ok(keep.then_some(item)),
        Err(e) => Err(Fault::operation(OperationKind::Filter.name(), render(&item), e)),
    }
}

pub(crate) fn inspect<T>(mut f: impl FnMut(&T)) -> impl FnMut(T) -> Applied<T> {
    move |item| {
        f(&item);
        Ok(Some(item))
    }
}

pub(crate) fn try_inspect<T, E>(mut f: impl FnMut(&T) -> Result<(), E>) -> impl FnMut(T) -> Applied<T>
where
    T: Debug,
    E: Into<BoxError>,
{
    move |item| match f(&item) {
        Ok(()) => Ok(Some(item)),
        Err(e) => Err(Fault::operation(OperationKind::Inspect.name(), render(&item), e)),
    }
}

pub(crate) fn filter_map<T, U>(mut f: impl FnMut(T) -> Option<U>) -> impl FnMut(T) -> Applied<U> {
    move |item| Ok(f(item))
}

pub(crate) fn try_filter_map<T, U, E>(
    mut f: impl FnMut(T) -> Result<Option<U>, E>,
) -> impl FnMut(T) -> Applied<U>
where
    T: Debug,
    E: Into<BoxError>,
{
    move |item| {
        let shown = render(&item);
        f(item).map_err(|e| Fault::operation(OperationKind::FilterMap.name(), shown, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    type TestStep<T> = Step<T, Infallible>;

    #[test]
    fn test_filter_drops() {
        let mut even = filter(|x: &i32| x % 2 == 0);
        assert!(matches!(TestStep::Success(3).apply(&mut even), Step::Filtered));
        assert!(matches!(TestStep::Success(4).apply(&mut even), Step::Success(4)));
    }

    #[test]
    fn test_dropped_item_skips_later_operations() {
        let mut calls = 0;
        let step = TestStep::Success(1)
            .apply(filter(|_: &i32| false))
            .apply(inspect(|_: &i32| calls += 1));
        assert!(matches!(step, Step::Filtered));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_try_map_renders_input_item() {
        let step = TestStep::Success(7).apply(try_map(|x: i32| {
            if x > 5 {
                Err("too big")
            } else {
                Ok(x)
            }
        }));
        match step {
            Step::Failed(fault) => assert_eq!(
                fault.at(0).to_string(),
                "Error occurred while performing map on 7 at index 0 in iterator: too big"
            ),
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn test_inspect_passes_value_through() {
        let mut seen = Vec::new();
        let step = TestStep::Success("a").apply(inspect(|x: &&str| seen.push(*x)));
        assert!(matches!(step, Step::Success("a")));
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn test_filter_map() {
        let mut parse = filter_map(|s: &str| s.parse::<i32>().ok());
        assert!(matches!(TestStep::Success("12").apply(&mut parse), Step::Success(12)));
        assert!(matches!(TestStep::Success("x").apply(&mut parse), Step::Filtered));
    }

    #[test]
    fn test_names() {
        assert_eq!(OperationKind::FilterMap.to_string(), "filter_map");
        assert_eq!(OperationKind::Inspect.name(), "inspect");
    }
}
