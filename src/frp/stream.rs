// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream - Push-Based Discrete-Time Signals
//!
//! A `Stream<T>` describes a sequence of values pushed to observers. Streams
//! are cold: every call to [`Stream::subscribe`] runs the producer again and
//! builds private operator state for that subscriber. [`Stream::share`] turns
//! a stream hot, so one upstream chain serves every subscriber.
//!
//! # Characteristics
//!
//! - **Push-based**: upstream calls the observer, nothing is polled
//! - **Synchronous by default**: only [`debounce`](Stream::debounce) defers work
//! - **Never completes**: a stream ends only when its subscription is cancelled
//!
//! # Operators
//!
//! - `map` - transform every value
//! - `debounce` - forward the last value of a burst once input goes quiet
//! - `distinct_until_changed` - drop values equal to the last forwarded one
//! - `drop_first` - discard the first `n` values
//! - `timestamped` - pair values with the scheduler's clock
//! - `share` - multicast one upstream subscription
//!
//! Multi-source operators live in [`combinators`](super::combinators).
//!
//! # Examples
//!
//! ```rust,ignore
//! let cell = SourceCell::new("password", String::new());
//! let strong = cell
//!     .stream()
//!     .debounce(Duration::from_millis(800), scheduler.clone())
//!     .distinct_until_changed()
//!     .map(|p| p.chars().count() >= 6);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::trace;

use super::scheduler::{Scheduler, TimerHandle};
use super::subscription::{Gate, Subscription};
use super::{lock, Occurrence};

/// Callback receiving values pushed by a stream
pub type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

type Producer<T> = Arc<dyn Fn(Observer<T>) -> Subscription + Send + Sync>;

/// Push-based stream of values
pub struct Stream<T> {
    producer: Producer<T>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stream<{}>", std::any::type_name::<T>())
    }
}

impl<T: Clone + Send + Sync + 'static> Stream<T> {
    /// Create a stream from a producer
    ///
    /// The producer is called once per subscriber with that subscriber's
    /// observer and returns the subscription that tears the chain down.
    pub fn new<P>(producer: P) -> Self
    where
        P: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Subscribe to the stream
    ///
    /// The observer is never called once [`Subscription::cancel`] has
    /// returned. Cancelling from another thread waits for a call already in
    /// progress, so a timer firing on a runtime worker cannot slip through.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let gate = Arc::new(Gate::new());
        let delivery = gate.clone();
        let subscription = self.attach(Arc::new(move |value: T| {
            delivery.deliver(|| observer(value));
        }));
        subscription.add(move || gate.close());
        subscription
    }

    pub(crate) fn attach(&self, observer: Observer<T>) -> Subscription {
        (self.producer)(observer)
    }

    /// Transform every value with `f`
    pub fn map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f = Arc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let f = f.clone();
            upstream.attach(Arc::new(move |value: T| observer(f(value))))
        })
    }

    /// Forward the most recent value once `interval` passes without input
    ///
    /// Every value restarts the timer and replaces the pending one. The first
    /// value is delayed like any other. Cancelling the subscription cancels a
    /// pending timer, so the held value is never delivered.
    pub fn debounce(&self, interval: Duration, scheduler: Arc<dyn Scheduler>) -> Stream<T> {
        let upstream = self.clone();
        Stream::new(move |observer: Observer<T>| {
            let pending: Arc<Mutex<Option<TimerHandle>>> = Arc::new(Mutex::new(None));
            let scheduler = scheduler.clone();

            let slot = pending.clone();
            let subscription = upstream.attach(Arc::new(move |value: T| {
                let observer = observer.clone();
                let mut pending = lock(&slot);
                if let Some(previous) = pending.take() {
                    trace!("debounce restarted");
                    previous.cancel();
                }
                *pending = Some(scheduler.schedule(interval, Box::new(move || observer(value))));
            }));

            subscription.add(move || {
                if let Some(timer) = lock(&pending).take() {
                    trace!("pending debounce dropped on teardown");
                    timer.cancel();
                }
            });
            subscription
        })
    }

    /// Drop the first `n` values, forward the rest unchanged
    pub fn drop_first(&self, n: usize) -> Stream<T> {
        let upstream = self.clone();
        Stream::new(move |observer: Observer<T>| {
            let dropped = AtomicUsize::new(0);
            upstream.attach(Arc::new(move |value: T| {
                let skip = dropped
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                        (count < n).then_some(count + 1)
                    })
                    .is_ok();
                if !skip {
                    observer(value);
                }
            }))
        })
    }

    /// Pair each value with the time it was emitted
    pub fn timestamped(&self, scheduler: Arc<dyn Scheduler>) -> Stream<Occurrence<T>> {
        self.map(move |value| (scheduler.now(), value))
    }

    /// Multicast one upstream subscription to every subscriber
    ///
    /// The upstream is attached when the first subscriber arrives and
    /// cancelled when the last one leaves. Values reach subscribers in the
    /// order they subscribed. Nothing is replayed: a late subscriber only sees
    /// values emitted after it joined.
    pub fn share(&self) -> Stream<T> {
        let upstream = self.clone();
        let hub: Arc<Mutex<Hub<T>>> = Arc::new(Mutex::new(Hub {
            next_id: 0,
            observers: Vec::new(),
            connection: None,
        }));

        Stream::new(move |observer: Observer<T>| {
            let (id, connect) = {
                let mut hub = lock(&hub);
                let id = hub.next_id;
                hub.next_id += 1;
                hub.observers.push((id, observer));
                (id, hub.connection.is_none() && hub.observers.len() == 1)
            };

            if connect {
                let fan_out = Arc::downgrade(&hub);
                let connection = upstream.attach(Arc::new(move |value: T| {
                    let Some(hub) = fan_out.upgrade() else {
                        return;
                    };
                    let observers: Vec<Observer<T>> = lock(&hub)
                        .observers
                        .iter()
                        .map(|(_, observer)| observer.clone())
                        .collect();
                    for observer in observers {
                        observer(value.clone());
                    }
                }));
                trace!("shared stream connected");
                lock(&hub).connection = Some(connection);
            }

            let hub = Arc::downgrade(&hub);
            Subscription::from_fn(move || {
                let Some(hub) = hub.upgrade() else {
                    return;
                };
                let connection = {
                    let mut hub = lock(&hub);
                    hub.observers.retain(|(other, _)| *other != id);
                    if hub.observers.is_empty() {
                        hub.connection.take()
                    } else {
                        None
                    }
                };
                if let Some(connection) = connection {
                    trace!("shared stream disconnected");
                    connection.cancel();
                }
            })
        })
    }
}

/// Subscribers of a shared stream and its single upstream connection
struct Hub<T> {
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
    connection: Option<Subscription>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Stream<T> {
    /// Forward a value only if it differs from the last forwarded one
    pub fn distinct_until_changed(&self) -> Stream<T> {
        let upstream = self.clone();
        Stream::new(move |observer: Observer<T>| {
            let last: Mutex<Option<T>> = Mutex::new(None);
            upstream.attach(Arc::new(move |value: T| {
                {
                    let mut last = lock(&last);
                    if last.as_ref() == Some(&value) {
                        return;
                    }
                    *last = Some(value.clone());
                }
                observer(value);
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frp::{SourceCell, VirtualScheduler};
    use pretty_assertions::assert_eq;

    fn collect<T: Clone + Send + Sync + 'static>(
        stream: &Stream<T>,
    ) -> (Arc<Mutex<Vec<T>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = stream.subscribe(move |value| sink.lock().unwrap().push(value));
        (seen, subscription)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_map_transforms_values() {
        let cell = SourceCell::new("n", 1);
        let (seen, _sub) = collect(&cell.stream().map(|x| x * 10));

        cell.set(2);
        assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
    }

    #[test]
    fn test_distinct_drops_consecutive_duplicates() {
        let cell = SourceCell::new("n", 1);
        let (seen, _sub) = collect(&cell.stream().distinct_until_changed());

        for value in [1, 2, 2, 1, 1, 3] {
            cell.set(value);
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 3]);
    }

    #[test]
    fn test_drop_first() {
        let cell = SourceCell::new("n", 0);
        let (seen, _sub) = collect(&cell.stream().drop_first(2));

        for value in 1..=3 {
            cell.set(value);
        }
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_drop_first_state_is_per_subscriber() {
        let cell = SourceCell::new("n", 0);
        let skipped = cell.stream().drop_first(1);
        let (first, _a) = collect(&skipped);
        cell.set(1);
        let (second, _b) = collect(&skipped);

        assert_eq!(*first.lock().unwrap(), vec![1]);
        assert!(second.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debounce_delays_first_value() {
        let clock = VirtualScheduler::new();
        let cell = SourceCell::new("text", String::new());
        let debounced = cell.stream().debounce(ms(800), Arc::new(clock.clone()));
        let (seen, _sub) = collect(&debounced.timestamped(Arc::new(clock.clone())));

        clock.advance(ms(799));
        assert!(seen.lock().unwrap().is_empty());

        clock.advance(ms(1));
        assert_eq!(*seen.lock().unwrap(), vec![(800, String::new())]);
    }

    #[test]
    fn test_debounce_coalesces_burst() {
        let clock = VirtualScheduler::new();
        let cell = SourceCell::new("text", String::new());
        let debounced = cell.stream().debounce(ms(800), Arc::new(clock.clone()));
        let (seen, _sub) = collect(&debounced.timestamped(Arc::new(clock.clone())));
        clock.advance(ms(800));

        for text in ["a", "ab", "abc"] {
            cell.set(text.to_string());
            clock.advance(ms(100));
        }
        clock.advance(ms(800));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(800, String::new()), (1800, "abc".to_string())]
        );
    }

    #[test]
    fn test_debounce_teardown_drops_pending() {
        let clock = VirtualScheduler::new();
        let cell = SourceCell::new("text", String::new());
        let (seen, sub) = collect(&cell.stream().debounce(ms(800), Arc::new(clock.clone())));
        assert_eq!(clock.pending_timers(), 1);

        sub.cancel();
        assert_eq!(clock.pending_timers(), 0);

        cell.set("late".to_string());
        clock.advance(ms(2000));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn test_share_attaches_upstream_once() {
        let clock = VirtualScheduler::new();
        let cell = SourceCell::new("text", String::new());
        let shared = cell
            .stream()
            .debounce(ms(800), Arc::new(clock.clone()))
            .share();

        let (upper, first) = collect(&shared.map(|text| text.to_uppercase()));
        let (length, second) = collect(&shared.map(|text| text.len()));
        assert_eq!(cell.subscriber_count(), 1);

        cell.set("abc".to_string());
        assert_eq!(clock.pending_timers(), 1);
        clock.advance(ms(800));

        assert_eq!(*upper.lock().unwrap(), vec!["ABC".to_string()]);
        assert_eq!(*length.lock().unwrap(), vec![3]);

        first.cancel();
        assert_eq!(cell.subscriber_count(), 1);
        second.cancel();
        assert_eq!(cell.subscriber_count(), 0);
        assert_eq!(clock.pending_timers(), 0);
    }

    #[test]
    fn test_share_delivers_in_subscription_order() {
        let cell = SourceCell::new("n", 0);
        let shared = cell.stream().drop_first(1).share();
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = order.clone();
        let _a = shared.subscribe(move |value| log.lock().unwrap().push(("a", value)));
        let log = order.clone();
        let _b = shared.subscribe(move |value| log.lock().unwrap().push(("b", value)));

        cell.set(7);
        assert_eq!(*order.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_share_reconnects_after_last_subscriber_leaves() {
        let cell = SourceCell::new("n", 1);
        let shared = cell.stream().share();

        let (first, sub) = collect(&shared);
        sub.cancel();
        let (second, _sub) = collect(&shared);
        cell.set(2);

        assert_eq!(*first.lock().unwrap(), vec![1]);
        // a fresh connection replays the cell's current value
        assert_eq!(*second.lock().unwrap(), vec![1, 2]);
    }
}
