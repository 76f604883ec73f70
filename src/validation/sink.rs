// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Sink
//!
//! Owns the two registers the outside world reads. Each register is a
//! `tokio::sync::watch` channel plus a list of synchronous listeners, so both
//! async tasks and plain callbacks observe every assignment.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::frp::{lock, Subscription};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Single-value register assigned by the pipeline
pub struct OutputRegister<T> {
    sender: watch::Sender<T>,
    listeners: Arc<Mutex<Vec<(u64, Listener<T>)>>>,
    next_id: Mutex<u64>,
}

impl<T: Clone + Send + Sync + 'static> OutputRegister<T> {
    /// Create a register holding `initial`
    pub fn new(initial: T) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            sender,
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_id: Mutex::new(0),
        }
    }

    /// Overwrite the value and notify watchers, then listeners
    pub fn assign(&self, value: T) {
        self.sender.send_replace(value.clone());
        let listeners: Vec<Listener<T>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&value);
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Receiver that observes every later assignment
    pub fn watch(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Call `listener` on every later assignment
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut next_id = lock(&self.next_id);
            let id = *next_id;
            *next_id += 1;
            id
        };
        lock(&self.listeners).push((id, Arc::new(listener)));

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::from_fn(move || {
            if let Some(listeners) = listeners.upgrade() {
                lock(&listeners).retain(|(other, _)| *other != id);
            }
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for OutputRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRegister")
            .field("value", &*self.sender.borrow())
            .finish_non_exhaustive()
    }
}

/// Point-in-time copy of both outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSnapshot {
    /// Whether the form can be submitted
    pub is_form_valid: bool,
    /// Message explaining what is wrong with the password fields
    pub password_error_text: String,
}

/// Registers written by the derivation graph
#[derive(Debug)]
pub struct OutputSink {
    /// Form validity flag
    pub form_valid: OutputRegister<bool>,
    /// Password error text
    pub password_error_text: OutputRegister<String>,
}

impl OutputSink {
    /// Create a sink with `false` and empty text
    pub fn new() -> Self {
        Self {
            form_valid: OutputRegister::new(false),
            password_error_text: OutputRegister::new(String::new()),
        }
    }

    /// Assign the validity flag
    pub fn assign_form_validity(&self, valid: bool) {
        self.form_valid.assign(valid);
    }

    /// Assign the password error text
    ///
    /// A message never sits next to a raised validity flag: the flag is
    /// lowered first.
    pub fn assign_password_error_text(&self, text: String) {
        if !text.is_empty() && self.form_valid.get() {
            self.form_valid.assign(false);
        }
        self.password_error_text.assign(text);
    }

    /// Copy both registers
    pub fn snapshot(&self) -> OutputSnapshot {
        OutputSnapshot {
            is_form_valid: self.form_valid.get(),
            password_error_text: self.password_error_text.get(),
        }
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_updates_value_and_listeners() {
        let register = OutputRegister::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = register.on_change(move |value: &bool| sink.lock().unwrap().push(*value));

        register.assign(true);
        register.assign(true);

        assert!(register.get());
        assert_eq!(*seen.lock().unwrap(), vec![true, true]);
    }

    #[test]
    fn test_cancelled_listener_not_called() {
        let register = OutputRegister::new(String::new());
        let seen = Arc::new(Mutex::new(0));
        let counter = seen.clone();
        let sub = register.on_change(move |_: &String| *counter.lock().unwrap() += 1);

        sub.cancel();
        register.assign("Password is empty".to_string());
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn test_watch_marks_assignment_as_change() {
        let register = OutputRegister::new(false);
        let mut receiver = register.watch();
        assert!(!receiver.has_changed().unwrap());

        register.assign(false);
        assert!(receiver.has_changed().unwrap());
        assert!(!*receiver.borrow_and_update());
    }

    #[test]
    fn test_snapshot_json() {
        let sink = OutputSink::new();
        sink.form_valid.assign(true);
        let json = serde_json::to_value(sink.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "is_form_valid": true, "password_error_text": "" })
        );
    }

    #[test]
    fn test_error_text_lowers_raised_flag() {
        let sink = Arc::new(OutputSink::new());
        sink.assign_form_validity(true);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let reader = Arc::downgrade(&sink);
        let _sub = sink.password_error_text.on_change(move |text: &String| {
            let valid = reader.upgrade().map(|sink| sink.form_valid.get());
            log.lock().unwrap().push((valid, text.clone()));
        });

        sink.assign_password_error_text("Passwords don't match".to_string());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Some(false), "Passwords don't match".to_string())]
        );
    }

    #[test]
    fn test_empty_error_text_keeps_flag() {
        let sink = OutputSink::new();
        sink.assign_form_validity(true);
        sink.assign_password_error_text(String::new());
        assert!(sink.form_valid.get());
    }
}
