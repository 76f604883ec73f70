// Copyright (c) 2025 - Cowboy AI, Inc.
//! SourceCell - Mutable input registers
//!
//! A `SourceCell<T>` is where values enter a stream graph. It holds the
//! latest value and broadcasts every write, synchronously and in subscription
//! order. New subscribers get the current value first (replay of one).
//!
//! Cells are written only by whoever owns them; the graph reads them through
//! [`SourceCell::stream`].

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::trace;

use super::lock;
use super::stream::{Observer, Stream};
use super::subscription::Subscription;

/// Mutable register broadcasting each write to its subscribers
pub struct SourceCell<T> {
    name: Arc<str>,
    state: Arc<Mutex<CellState<T>>>,
}

struct CellState<T> {
    value: T,
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
}

impl<T> Clone for SourceCell<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SourceCell<T> {
    /// Create a cell holding `initial`
    pub fn new(name: impl Into<Arc<str>>, initial: T) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(CellState {
                value: initial,
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn get(&self) -> T {
        lock(&self.state).value.clone()
    }

    /// Store `value` and notify every subscriber with it
    pub fn set(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let mut state = lock(&self.state);
            state.value = value.clone();
            state.observers.iter().map(|(_, o)| o.clone()).collect()
        };
        trace!(cell = %self.name, subscribers = observers.len(), "cell written");
        for observer in observers {
            observer(value.clone());
        }
    }

    /// Subscribe directly to the cell
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.stream().subscribe(observer)
    }

    /// Number of attached observers
    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).observers.len()
    }

    /// Stream of the current value followed by every write
    pub fn stream(&self) -> Stream<T> {
        let state = self.state.clone();
        Stream::new(move |observer: Observer<T>| {
            let (id, current) = {
                let mut cell = lock(&state);
                let id = cell.next_id;
                cell.next_id += 1;
                cell.observers.push((id, observer.clone()));
                (id, cell.value.clone())
            };
            observer(current);

            let state = Arc::downgrade(&state);
            Subscription::from_fn(move || {
                if let Some(state) = state.upgrade() {
                    lock(&state).observers.retain(|(other, _)| *other != id);
                }
            })
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for SourceCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("SourceCell")
            .field("name", &self.name)
            .field("value", &state.value)
            .field("subscribers", &state.observers.len())
            .finish()
    }
}
