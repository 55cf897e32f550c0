//! Two-outcome completion channel.
//!
//! Surfaces report the end of a load through a [`Completion`], the Rust
//! counterpart of an element's `load` / `error` hooks. The coordinator holds
//! the receiving half and never assumes the completion fires synchronously.

use tokio::sync::oneshot;

use crate::environment::traits::SurfaceError;

/// Receiving half of a completion, owned by the coordinator.
pub(crate) type CompletionReceiver<T> = oneshot::Receiver<Result<T, SurfaceError>>;

/// Single-use handle a surface fires exactly once when a load settles.
///
/// Dropping a completion without firing it is reported to waiting callers as
/// an unexpected failure.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<Result<T, SurfaceError>>,
}

impl<T> Completion<T> {
    /// Creates a completion and the receiver that observes it.
    pub(crate) fn channel() -> (Self, CompletionReceiver<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Signals a successful load.
    pub fn loaded(self, value: T) {
        self.settle(Ok(value));
    }

    /// Signals a failed load.
    pub fn failed(self, error: SurfaceError) {
        self.settle(Err(error));
    }

    /// Signals either outcome.
    pub fn settle(self, outcome: Result<T, SurfaceError>) {
        // Receiver gone means nobody is left to settle; nothing to report.
        let _ = self.tx.send(outcome);
    }
}
