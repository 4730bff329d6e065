//! Per-item routing shared by the sync and async traversal loops
//!
//! A [`Cursor`] sees one pulled step at a time and decides whether it is
//! yielded, skipped, or ends the traversal. The loops only differ in how they
//! pull: `Iterator::next` or `StreamExt::next().await`.

use std::fmt::Debug;

use crate::error::{BoxError, Fault};
use crate::handler::ErrorHandler;
use crate::operation::{render, Step};

/// What the traversal loop does after routing a step
pub(crate) enum Flow<T, A> {
    Yield(T),
    Continue,
    Abort(A),
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Exhausted,
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor<H> {
    handler: H,
    index: usize,
    state: State,
}

impl<H: ErrorHandler> Cursor<H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            index: 0,
            state: State::Ready,
        }
    }

    pub(crate) fn handler(&self) -> &H {
        &self.handler
    }

    /// Index the next pulled item will get
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Route one pulled step. `None` means the source is done.
    pub(crate) fn route<T>(&mut self, pulled: Option<Step<T, H::Abort>>) -> Flow<T, H::Abort> {
        let step = match pulled {
            Some(step) => step,
            None => {
                log::trace!("traversal exhausted after {} pulls", self.index);
                self.state = State::Exhausted;
                return Flow::Exhausted;
            }
        };

        let index = self.index;
        self.index += 1;

        match step {
            Step::Success(item) => Flow::Yield(item),
            Step::Filtered => Flow::Continue,
            Step::Failed(fault) => match self.handler.register(fault.at(index)) {
                Ok(()) => Flow::Continue,
                Err(abort) => {
                    self.state = State::Exhausted;
                    Flow::Abort(abort)
                }
            },
            Step::Aborted(abort) => {
                self.state = State::Exhausted;
                Flow::Abort(abort)
            }
        }
    }
}

/// One step of a fallible fold. A failing `op` is routed to the handler as a
/// `reduce` error and, unless that aborts, leaves the accumulator unchanged.
pub(crate) fn fold_routed<H, B, T, E>(
    handler: &H,
    acc: B,
    position: usize,
    item: T,
    op: &mut impl FnMut(&B, T) -> Result<B, E>,
) -> Result<B, H::Abort>
where
    H: ErrorHandler,
    T: Debug,
    E: Into<BoxError>,
{
    let shown = render(&item);
    match op(&acc, item) {
        Ok(next) => Ok(next),
        Err(e) => {
            handler.register(Fault::operation("reduce", shown, e).at(position))?;
            Ok(acc)
        }
    }
}
