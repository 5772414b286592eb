//! Dual-mode invocation.
//!
//! Every request terminal is async first. The callback form is derived from
//! it by [`spawn_with_callback`], which runs the future on the tokio runtime
//! and hands its outcome to the callback exactly once. The opposite bridge,
//! [`suspend`], turns an operation that reports through a completion handle
//! into a future.

use bilirq_core::error::{RequestError, RequestResult};
use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs `future` in a new task and passes its outcome to `callback`.
///
/// The callback is invoked at most once, after the future has resolved. The
/// outcome is forwarded without translation. With no callback the future
/// still runs to completion and its outcome is discarded.
///
/// Must be called from within a tokio runtime.
pub fn spawn_with_callback<T, F, C>(future: F, callback: Option<C>) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = RequestResult<T>> + Send + 'static,
    C: FnOnce(RequestResult<T>) + Send + 'static,
{
    tokio::spawn(async move {
        let result = future.await;
        if let Some(callback) = callback {
            callback(result);
        }
    })
}

/// One-shot completion handle handed to a callback-style operation.
///
/// Consuming [`complete`](Self::complete) guarantees the result is delivered
/// at most once. Dropping the handle without completing resolves the waiting
/// future with [`RequestError::Network`].
#[derive(Debug)]
pub struct Completion<T> {
    sender: oneshot::Sender<RequestResult<T>>,
}

impl<T> Completion<T> {
    /// Delivers `result` to the waiting future.
    pub fn complete(self, result: RequestResult<T>) {
        if self.sender.send(result).is_err() {
            debug!("Completion delivered after the waiting future was dropped");
        }
    }
}

/// Bridges a callback-style operation to a future.
///
/// `start` receives a [`Completion`] and must arrange for it to be completed
/// or dropped. The returned future resolves with whatever result is
/// delivered, verbatim.
pub async fn suspend<T, F>(start: F) -> RequestResult<T>
where
    F: FnOnce(Completion<T>),
{
    let (sender, receiver) = oneshot::channel();
    start(Completion { sender });
    receiver.await.unwrap_or_else(|_| {
        debug!("Completion dropped without a result");
        Err(RequestError::Network)
    })
}
