// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription handles and the registry that owns them
//!
//! A [`Subscription`] is a cancellable handle carrying teardown actions.
//! Cancelling runs every action exactly once, most recently added first.
//! Actions added after cancellation run immediately.
//!
//! A [`SubscriptionRegistry`] collects the subscriptions created while wiring
//! a graph so they can be torn down together.
//!
//! A [`Gate`] sits in front of each subscriber's observer. Closing it waits
//! for a delivery running on another thread, so once a cancel returns the
//! observer is never called again.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use super::lock;

type Teardown = Box<dyn FnOnce() + Send>;

/// Cancellable handle for an active stream subscription
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

struct SubscriptionInner {
    cancelled: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

impl Subscription {
    /// Create an empty subscription with no teardown actions
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                cancelled: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a subscription that runs `teardown` when cancelled
    pub fn from_fn<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let subscription = Self::new();
        subscription.add(teardown);
        subscription
    }

    /// Register a teardown action
    pub fn add<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut teardowns = lock(&self.inner.teardowns);
        if self.is_cancelled() {
            drop(teardowns);
            teardown();
            return;
        }
        teardowns.push(Box::new(teardown));
    }

    /// Cancel `child` when this subscription is cancelled
    pub fn add_child(&self, child: Subscription) {
        self.add(move || child.cancel());
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Run all teardown actions. Later calls do nothing.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let teardowns = std::mem::take(&mut *lock(&self.inner.teardowns));
        for teardown in teardowns.into_iter().rev() {
            teardown();
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Owns every subscription created while wiring a graph
///
/// `cancel_all` is the only way tracked subscriptions are cancelled. It is
/// idempotent, and anything tracked afterwards is cancelled on arrival.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: Mutex<Vec<Subscription>>,
    torn_down: AtomicBool,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a subscription
    pub fn track(&self, subscription: Subscription) {
        let mut subscriptions = lock(&self.subscriptions);
        if self.is_torn_down() {
            drop(subscriptions);
            subscription.cancel();
            return;
        }
        subscriptions.push(subscription);
    }

    /// Number of subscriptions currently owned
    pub fn len(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Whether the registry owns no subscriptions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`cancel_all`](Self::cancel_all) has run
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Cancel every tracked subscription
    ///
    /// Returns how many subscriptions were cancelled by this call.
    pub fn cancel_all(&self) -> usize {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let subscriptions = std::mem::take(&mut *lock(&self.subscriptions));
        let count = subscriptions.len();
        for subscription in subscriptions {
            subscription.cancel();
        }
        count
    }
}

/// Admission control for deliveries to one observer
///
/// Deliveries from different threads run one at a time. A delivery nested in
/// another on the same thread is let through, and so is a `close` issued from
/// inside a delivery, which returns without waiting for its own caller.
pub(crate) struct Gate {
    state: Mutex<GateState>,
    idle: Condvar,
}

struct GateState {
    open: bool,
    owner: Option<ThreadId>,
    depth: usize,
}

impl GateState {
    fn held_elsewhere(&self, me: ThreadId) -> bool {
        matches!(self.owner, Some(owner) if owner != me)
    }
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                open: true,
                owner: None,
                depth: 0,
            }),
            idle: Condvar::new(),
        }
    }

    /// Run `deliver` unless the gate has been closed
    pub(crate) fn deliver<F: FnOnce()>(&self, deliver: F) {
        let me = thread::current().id();
        {
            let mut state = lock(&self.state);
            while state.open && state.held_elsewhere(me) {
                state = self.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
            }
            if !state.open {
                return;
            }
            state.owner = Some(me);
            state.depth += 1;
        }
        let _turn = Turn(self);
        deliver();
    }

    /// Refuse further deliveries and wait out one running on another thread
    pub(crate) fn close(&self) {
        let me = thread::current().id();
        let mut state = lock(&self.state);
        state.open = false;
        while state.held_elsewhere(me) {
            state = self.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Releases the gate when a delivery returns or unwinds
struct Turn<'a>(&'a Gate);

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut state = lock(&self.0.state);
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.0.idle.notify_all();
        }
    }
}
