// src/scheduler.rs - debounced task scheduling
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, trace};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use crate::{NotebookError, Result};

/// Runs at most one delayed task at a time, with schedule-or-replace semantics.
///
/// Every call to [`schedule`](Self::schedule) replaces the pending task and restarts the
/// delay, so a burst of calls collapses into a single execution of the last task.
/// [`supersede`](Self::supersede) runs work immediately and guarantees that no task
/// scheduled before it will run afterwards.
pub struct DebounceScheduler {
    /// Quiet period before a scheduled task runs
    interval: Duration,

    /// Runtime the delayed tasks are spawned on
    runtime: Handle,

    /// Generation of the latest schedule/supersede. Held while a task executes.
    generation: Arc<Mutex<u64>>,

    /// Handle to the pending task, if any
    pending: Option<JoinHandle<()>>,
}

impl DebounceScheduler {
    /// Creates a scheduler on the current tokio runtime
    pub fn new(interval: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| NotebookError::SchedulerUnavailable {
            message: e.to_string(),
        })?;
        Ok(Self::with_handle(interval, runtime))
    }

    pub fn with_handle(interval: Duration, runtime: Handle) -> Self {
        debug!("Initializing debounce scheduler with interval {:?}", interval);
        Self {
            interval,
            runtime,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedules `task` to run once the interval elapses, replacing any pending task
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = {
            let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
            *current += 1;
            *current
        };
        self.abort_pending();

        let generation = Arc::clone(&self.generation);
        let interval = self.interval;

        self.pending = Some(self.runtime.spawn(async move {
            time::sleep(interval).await;

            let current = generation.lock().unwrap_or_else(PoisonError::into_inner);
            if *current != ticket {
                trace!("Debounced task {} was superseded", ticket);
                return;
            }
            trace!("Running debounced task {}", ticket);
            task();
        }));

        trace!("Scheduled debounced task {} in {:?}", ticket, interval);
    }

    /// Cancels the pending task and runs `work` now, excluding any in-flight task
    pub fn supersede<R>(&mut self, work: impl FnOnce() -> R) -> R {
        let generation = Arc::clone(&self.generation);
        let mut current = generation.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        self.abort_pending();
        work()
    }

    /// Drops the pending task without running it. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.supersede(|| ());
        if was_pending {
            debug!("Cancelled pending debounced task");
        }
        was_pending
    }

    /// Whether a scheduled task has yet to run
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn abort_pending(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
    }
}
