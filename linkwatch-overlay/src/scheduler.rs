//! Repeating tick task with idempotent arm and disarm.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle for a running tick task.
#[derive(Debug)]
struct TickTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// A single recurring timer.
///
/// At most one tick task is armed at a time. Arming an armed scheduler and
/// cancelling a cancelled one are both no-ops. Both operations are
/// serialized by one lock so concurrent callers never arm two tasks.
///
/// Scheduling is fixed-delay and best effort: a slow tick delays the ones
/// after it rather than bursting to catch up.
#[derive(Debug, Default)]
pub struct Scheduler {
    task: Mutex<Option<TickTask>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer. The first tick fires one `period` from now.
    ///
    /// `tick` is called on every fire; returning `ControlFlow::Break` ends
    /// the task. Returns false if a task was already armed. Must be called
    /// from within a tokio runtime.
    pub fn schedule_repeating<F, Fut>(&self, period: Duration, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let mut task = self.task.lock();
        if task.is_some() {
            debug!("Tick task already running");
            return false;
        }

        debug!("Starting tick task every {:?}", period);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = timer.tick() => {
                        if tick().await.is_break() {
                            break;
                        }
                    }
                }
            }
            debug!("Tick task stopped");
        });

        *task = Some(TickTask { stop_tx, handle });
        true
    }

    /// Disarm the timer. A tick already in progress runs to completion but
    /// no further ticks fire. Returns false if nothing was armed.
    pub fn cancel(&self) -> bool {
        match self.task.lock().take() {
            Some(task) => {
                let _ = task.stop_tx.send(true);
                true
            }
            None => false,
        }
    }

    /// True if a tick task is armed and has not exited.
    pub fn is_armed(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
