// Copyright (c) 2025 - Cowboy AI, Inc.
//! Timer services for time-aware operators
//!
//! Operators that delay values never touch a clock directly. They ask a
//! [`Scheduler`] to run a task later and keep the returned [`TimerHandle`] so
//! the task can be cancelled.
//!
//! # Implementations
//!
//! - [`TokioScheduler`]: spawns a task on a tokio runtime that sleeps, then runs.
//!   Due tasks take turns, so a multi-thread runtime still sees one timeline
//! - [`VirtualScheduler`]: keeps a queue of due tasks that only run when the
//!   clock is advanced by hand, for deterministic tests
//!
//! ```text
//! schedule(800ms, task)         advance(800ms)
//!        │                            │
//!        ▼                            ▼
//!   queue[(now + 800, seq)]  ──>  task() at due time
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::trace;

use super::{lock, millis, Time};
use crate::errors::{PipelineError, PipelineResult};

/// Deferred unit of work
pub type Task = Box<dyn FnOnce() + Send>;

/// Service that runs tasks after a delay
pub trait Scheduler: Send + Sync {
    /// Current time on this scheduler's clock
    fn now(&self) -> Time;

    /// Run `task` once `delay` has elapsed
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Handle to a scheduled task
///
/// Dropping the handle leaves the task scheduled.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Create a handle that runs `cancel` when the timer is cancelled
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Prevent the task from running if it has not run yet
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

/// Scheduler backed by the tokio timer wheel
///
/// Tasks are synchronous and never overlap: a task that comes due while
/// another runs on a different worker waits for it to finish.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
    origin: Instant,
    timeline: Arc<Mutex<()>>,
}

impl TokioScheduler {
    /// Create a scheduler spawning onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            origin: Instant::now(),
            timeline: Arc::new(Mutex::new(())),
        }
    }

    /// Create a scheduler for the runtime the caller is running on
    pub fn current() -> PipelineResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| PipelineError::Runtime(e.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Time {
        millis(self.origin.elapsed())
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let timeline = self.timeline.clone();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _turn = lock(&timeline);
            task();
        });
        TimerHandle::new(move || join.abort())
    }
}

/// Manually advanced scheduler
///
/// Tasks due at the same time run in the order they were scheduled.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    state: Arc<Mutex<VirtualState>>,
}

#[derive(Default)]
struct VirtualState {
    now: Time,
    next_seq: u64,
    queue: BTreeMap<(Time, u64), Task>,
}

impl VirtualScheduler {
    /// Create a scheduler with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending_timers(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Move the clock forward, running every task that falls due on the way
    ///
    /// Tasks scheduled by a running task are honoured if they fall due before
    /// the target time.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.state).now.saturating_add(millis(by));
        loop {
            let next = {
                let mut state = lock(&self.state);
                let due = state.queue.first_key_value().map(|(&(due, _), _)| due);
                match due {
                    Some(due) if due <= target => {
                        state.now = due;
                        state.queue.pop_first().map(|(_, task)| task)
                    }
                    _ => None,
                }
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        lock(&self.state).now = target;
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Time {
        lock(&self.state).now
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let key = {
            let mut state = lock(&self.state);
            let key = (state.now.saturating_add(millis(delay)), state.next_seq);
            state.next_seq += 1;
            state.queue.insert(key, task);
            key
        };
        trace!(due = key.0, "virtual timer scheduled");

        let state: Weak<Mutex<VirtualState>> = Arc::downgrade(&self.state);
        TimerHandle::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).queue.remove(&key);
            }
        })
    }
}

impl fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("VirtualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}
