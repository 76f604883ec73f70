// Copyright (c) 2025 - Cowboy AI, Inc.
//! Functional Reactive Programming (FRP) Streams
//!
//! This module provides push-based, time-aware streams used to derive stable
//! values from noisy input. Values only move when a [`SourceCell`] is written;
//! every other stage reacts to what its upstream pushes.
//!
//! # Core Concepts
//!
//! ## SourceCell<T>
//!
//! A mutable register. Subscribers receive the current value on attach, then
//! every write in order.
//!
//! ## Stream<T> (Discrete-Time)
//!
//! A cold description of a sequence of occurrences. Each `subscribe` builds a
//! fresh chain of operator state and returns a [`Subscription`]. `share()`
//! lets several subscribers ride one chain.
//!
//! ```text
//! Time: ────────────────────────────→
//! Write:  ● ● ●         ●
//! Debounced:    ·····●        ·····●
//! ```
//!
//! ## Scheduler
//!
//! Timers are injected. [`TokioScheduler`] runs on the tokio clock,
//! [`VirtualScheduler`] is advanced by hand.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_form_validation::frp::*;
//!
//! let clock = VirtualScheduler::new();
//! let name = SourceCell::new("name", String::new());
//!
//! let settled = name
//!     .stream()
//!     .debounce(Duration::from_millis(800), Arc::new(clock.clone()))
//!     .distinct_until_changed()
//!     .map(|v| v.len());
//!
//! let subscription = settled.subscribe(|len| println!("{len}"));
//! name.set("abc".to_string());
//! clock.advance(Duration::from_millis(800));
//! subscription.cancel();
//! ```

pub mod cell;
pub mod combinators;
pub mod scheduler;
pub mod stream;
pub mod subscription;

pub use cell::SourceCell;
pub use combinators::*;
pub use scheduler::{Scheduler, Task, TimerHandle, TokioScheduler, VirtualScheduler};
pub use stream::{Observer, Stream};
pub use subscription::{Subscription, SubscriptionRegistry};

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Time representation (milliseconds on the scheduler's clock)
pub type Time = i64;

/// A value paired with the time it was emitted
pub type Occurrence<T> = (Time, T);

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn millis(duration: Duration) -> Time {
    Time::try_from(duration.as_millis()).unwrap_or(Time::MAX)
}
