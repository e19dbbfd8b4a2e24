//! Wall-clock tick driver.
//!
//! A worker thread waits on a `crossbeam_channel::tick` timer and calls the
//! tick callback once per interval. The [`TickDriver`] handle owns the thread:
//! cancelling or dropping it closes the cancel channel and joins the worker,
//! so no callback runs after `cancel` returns.

use crossbeam_channel::{bounded, select, tick, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// What the worker should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    /// Leave the loop (the run ended on its own)
    Stop,
}

/// Handle to a repeating tick worker.
#[derive(Debug)]
pub struct TickDriver {
    cancel: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Call `on_tick` every `interval` until it returns [`TickControl::Stop`]
    /// or the handle is cancelled.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let worker = thread::spawn(move || {
            loop {
                select! {
                    recv(cancel_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        if on_tick() == TickControl::Stop {
                            break;
                        }
                    }
                }
            }
            debug!("tick worker exited");
        });

        TickDriver {
            cancel: Some(cancel_tx),
            worker: Some(worker),
        }
    }

    /// The worker has left its loop (stopped itself or was cancelled).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the worker and wait for it. Idempotent.
    pub fn cancel(&mut self) {
        // Dropping the sender disconnects the channel and wakes the select.
        drop(self.cancel.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("tick worker panicked");
            }
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
