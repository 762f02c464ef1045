//! Typed store notifications
//!
//! UI collaborators observe the store through a typed event channel
//! instead of string-keyed events: one enum, one subscription call. Every
//! failure path notifies on the same channel as success so a renderer can
//! clear loading state uniformly.

use navmenu_model::MenuId;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Notification emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// In-memory state changed (edit, fetch, rollback, ...)
    Change,
    /// A save round trip started
    Saving(Option<MenuId>),
    /// A save round trip finished successfully
    Saved(Option<MenuId>),
    /// An operation failed; the message is display-ready
    Error(String),
}

/// Fan-out hub for [`StoreEvent`]
///
/// Senders are pruned lazily when a receiver goes away. Emission is
/// synchronous and never performed while the store's state lock is held.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StoreEvent>>>,
}

impl EventHub {
    /// Create an empty hub
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe; the receiver sees every event emitted from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Deliver an event to every live subscriber
    pub fn emit(&self, event: StoreEvent) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers (drops are detected on emit)
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
