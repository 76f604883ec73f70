// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Combinators
//!
//! This module provides combinators that join several streams into one.
//!
//! # Available Combinators
//!
//! - `combine_latest2` / `combine_latest3` - streams of different types into
//!   a stream of tuples
//!
//! Every arity is stamped out of the same macro body. Nothing is emitted
//! until each upstream has produced a value, then every upstream emission
//! produces one combined value built from the latest value of each upstream.
//! Emissions are not coalesced and combined values are not compared; chain
//! `distinct_until_changed` if duplicates matter.
//!
//! # Examples
//!
//! ```rust,ignore
//! use cim_form_validation::frp::combinators::*;
//!
//! let pair = combine_latest2(&password.stream(), &repeat.stream());
//! let equal = pair.map(|(a, b)| a == b);
//! ```

use std::sync::{Arc, Mutex};

use super::lock;
use super::stream::{Observer, Stream};
use super::subscription::Subscription;

macro_rules! combine_latest_tuple {
    ($(#[$meta:meta])* $name:ident => $(($ty:ident, $source:ident, $slot:ident, $index:tt)),+) => {
        $(#[$meta])*
        pub fn $name<$($ty),+>($($source: &Stream<$ty>),+) -> Stream<($($ty,)+)>
        where
            $($ty: Clone + Send + Sync + 'static,)+
        {
            $(let $source = $source.clone();)+
            Stream::new(move |observer: Observer<($($ty,)+)>| {
                let latest: Arc<Mutex<($(Option<$ty>,)+)>> = Arc::new(Mutex::new(Default::default()));
                let complete: fn(&($(Option<$ty>,)+)) -> Option<($($ty,)+)> = |slots| match slots {
                    ($(Some($slot),)+) => Some(($($slot.clone(),)+)),
                    _ => None,
                };
                let subscription = Subscription::new();
                $(
                    let latest_slots = latest.clone();
                    let downstream = observer.clone();
                    let child = $source.attach(Arc::new(move |value: $ty| {
                        let combined = {
                            let mut slots = lock(&latest_slots);
                            slots.$index = Some(value);
                            complete(&slots)
                        };
                        if let Some(values) = combined {
                            downstream(values);
                        }
                    }));
                    subscription.add_child(child);
                )+
                subscription
            })
        }
    };
}

combine_latest_tuple! {
    /// Combine two streams into a stream of pairs
    combine_latest2 => (A, a, va, 0), (B, b, vb, 1)
}

combine_latest_tuple! {
    /// Combine three streams into a stream of triples
    combine_latest3 => (A, a, va, 0), (B, b, vb, 1), (C, c, vc, 2)
}
