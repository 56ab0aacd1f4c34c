//! Notifications a host subscribes to.
//!
//! Every subscriber gets its own unbounded channel, so a slow host never blocks
//! the session. Receivers that have been dropped are pruned on the next emit.
//!
//! ```rust,ignore
//! let events = session.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             SessionEvent::ResultSetReplaced { count, .. } => redraw_all(count),
//!             SessionEvent::FocusChanged { index } => scroll_to(index),
//!             SessionEvent::EntryConsumed { entry, .. } => clear_highlight(entry.range),
//!             SessionEvent::ResultSetDiscarded => clear_all(),
//!         }
//!     }
//! });
//! ```

use crate::result_set::ResultEntry;
use async_channel::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A response was accepted and its results replaced the previous set.
    ResultSetReplaced { generation: u64, count: usize },

    /// The focused result moved.
    FocusChanged { index: usize },

    /// A replacement was applied and its entry removed from the set.
    EntryConsumed { index: usize, entry: ResultEntry },

    /// The result view was closed.
    ResultSetDiscarded,
}

#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = async_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| !tx.is_closed());
        for tx in &self.subscribers {
            let _ = tx.try_send(event.clone());
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
