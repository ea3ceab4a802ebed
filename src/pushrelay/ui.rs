//! Session-affine execution.
//!
//! Each session owns its view state on a single task. Work that finishes
//! elsewhere (a blocking backend call, a broadcast) hands its result back
//! through [`UiHandle::access`], so the state is only ever touched from
//! that task and needs no lock.

use log::debug;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorCode, PushError, Result};

pub type UiTask<S> = Box<dyn FnOnce(&mut S) + Send>;

pub struct UiHandle<S> {
    tx: UnboundedSender<UiTask<S>>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<S: Send + 'static> UiHandle<S> {
    /// Starts the executor owning `state`. The returned join handle yields
    /// the final state once `cancel` fires or every handle is dropped.
    pub fn spawn(state: S, cancel: CancellationToken) -> (Self, JoinHandle<S>) {
        let (tx, rx) = unbounded_channel::<UiTask<S>>();
        let join = tokio::spawn(Self::run(state, rx, cancel));
        (Self { tx }, join)
    }

    async fn run(mut state: S, mut rx: UnboundedReceiver<UiTask<S>>, cancel: CancellationToken) -> S {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("UI executor cancelled");
                    break;
                }
                task = rx.recv() => match task {
                    Some(task) => task(&mut state),
                    None => {
                        debug!("All UI handles dropped");
                        break;
                    }
                },
            }
        }
        state
    }

    /// Queues `f` to run against the state; never blocks the caller
    pub fn access<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(Box::new(f))
            .map_err(|_| PushError::new(ErrorCode::UiClosed, "Session is no longer running"))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
