//! # engine::broadcaster
//!
//! **Subscription Broadcaster**: registry of connected WebSocket listeners,
//! each with an optional symbol filter.
//!
//! ```text
//!  publish("AAPL", ev) ──▶ for each listener:
//!                             filter == None      → push
//!                             filter == "AAPL"    → push
//!                             filter == "MSFT"    → skip
//!                             queue closed        → prune
//!                             queue full          → drop (listener lagging)
//! ```
//!
//! Each listener owns a bounded `mpsc` queue drained by its socket task.
//! Pushes use `try_send`, so a stalled client only loses its own messages and
//! never holds up the tick.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::events::WsEvent;

pub type ListenerId = Uuid;

/// One connected client.
#[derive(Debug)]
struct Listener {
    /// `None` = receive every symbol.
    filter: Option<String>,
    tx: mpsc::Sender<String>,
}

impl Listener {
    #[inline]
    fn wants(&self, symbol: &str) -> bool {
        self.filter.as_deref().map_or(true, |f| f == symbol)
    }
}

pub struct Broadcaster {
    listeners: RwLock<HashMap<ListenerId, Listener>>,
    queue_capacity: usize,
}

impl Broadcaster {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new unfiltered listener.  The receiver yields pre-serialised
    /// JSON frames.
    pub async fn connect(&self) -> (ListenerId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = Uuid::new_v4();

        let mut guard = self.listeners.write().await;
        guard.insert(id, Listener { filter: None, tx });
        info!(listener = %id, total = guard.len(), "Listener connected");

        (id, rx)
    }

    /// Remove a listener.  Returns `false` if it was already gone.
    pub async fn disconnect(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.write().await;
        let removed = guard.remove(&id).is_some();
        if removed {
            info!(listener = %id, total = guard.len(), "Listener disconnected");
        }
        removed
    }

    /// Set (or clear, with `None`) the listener's symbol filter.  Returns
    /// `false` for an unknown listener.
    pub async fn subscribe(&self, id: ListenerId, symbol: Option<String>) -> bool {
        let mut guard = self.listeners.write().await;
        match guard.get_mut(&id) {
            Some(listener) => {
                debug!(listener = %id, ?symbol, "Listener filter set");
                listener.filter = symbol;
                true
            }
            None => false,
        }
    }

    /// Clear the filter.  Calling it again changes nothing.
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        self.subscribe(id, None).await
    }

    /// Current filter of a listener; outer `None` if unknown.
    #[cfg(test)]
    pub async fn filter_of(&self, id: ListenerId) -> Option<Option<String>> {
        let guard = self.listeners.read().await;
        guard.get(&id).map(|l| l.filter.clone())
    }

    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Fan `event` out to every listener interested in `symbol`.  Returns how
    /// many listeners accepted it.  Listeners whose queue is closed are pruned.
    pub async fn publish(&self, symbol: &str, event: &WsEvent) -> usize {
        let json = event.to_json();
        let mut delivered = 0;

        let mut guard = self.listeners.write().await;
        guard.retain(|id, listener| {
            if !listener.wants(symbol) {
                return !listener.tx.is_closed();
            }
            match listener.tx.try_send(json.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(listener = %id, symbol, "Listener lagging, update dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(listener = %id, "Listener gone, pruned");
                    false
                }
            }
        });

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PricePayload, PriceUpdate};
    use chrono::Utc;

    fn update(symbol: &str) -> WsEvent {
        PriceUpdate {
            symbol: symbol.to_string(),
            data: PricePayload {
                current_price:  100.0,
                change:         1.0,
                change_percent: 1.0,
                volume:         1,
                timestamp:      Utc::now(),
            },
        }
        .into()
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_fan_out_respects_filters() {
        let hub = Broadcaster::new(8);
        let (l1, mut rx1) = hub.connect().await;
        let (_l2, mut rx2) = hub.connect().await;
        let (l3, mut rx3) = hub.connect().await;
        hub.subscribe(l1, Some("AAPL".into())).await;
        hub.subscribe(l3, Some("MSFT".into())).await;

        let delivered = hub.publish("AAPL", &update("AAPL")).await;

        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut rx1).len(), 1);
        assert_eq!(drain(&mut rx2).len(), 1);
        assert!(drain(&mut rx3).is_empty());
    }

    #[tokio::test]
    async fn test_at_most_one_message_per_publish() {
        let hub = Broadcaster::new(8);
        let (id, mut rx) = hub.connect().await;
        hub.subscribe(id, Some("AAPL".into())).await;

        hub.publish("AAPL", &update("AAPL")).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let hub = Broadcaster::new(8);
        let (id, _rx) = hub.connect().await;
        hub.subscribe(id, Some("TSLA".into())).await;

        assert!(hub.unsubscribe(id).await);
        assert_eq!(hub.filter_of(id).await, Some(None));
        assert!(hub.unsubscribe(id).await);
        assert_eq!(hub.filter_of(id).await, Some(None));
        assert_eq!(hub.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_listener_is_noop() {
        let hub = Broadcaster::new(8);
        let ghost = Uuid::new_v4();
        assert!(!hub.subscribe(ghost, Some("AAPL".into())).await);
        assert!(!hub.unsubscribe(ghost).await);
        assert!(!hub.disconnect(ghost).await);
        assert_eq!(hub.len().await, 0);
    }

    #[tokio::test]
    async fn test_disconnected_listener_receives_nothing() {
        let hub = Broadcaster::new(8);
        let (l1, mut rx1) = hub.connect().await;
        hub.subscribe(l1, Some("AAPL".into())).await;

        assert!(hub.disconnect(l1).await);
        let delivered = hub.publish("AAPL", &update("AAPL")).await;

        assert_eq!(delivered, 0);
        // sender dropped with the registry entry → channel closed and empty
        assert_eq!(rx1.recv().await, None);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let hub = Broadcaster::new(8);
        let (_gone, rx_gone) = hub.connect().await;
        let (_alive, mut rx_alive) = hub.connect().await;
        drop(rx_gone);

        let delivered = hub.publish("NVDA", &update("NVDA")).await;

        assert_eq!(delivered, 1);
        assert_eq!(hub.len().await, 1);
        assert_eq!(drain(&mut rx_alive).len(), 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let hub = Broadcaster::new(1);
        let (_slow, mut rx_slow) = hub.connect().await;
        let (_fast, mut rx_fast) = hub.connect().await;

        assert_eq!(hub.publish("AAPL", &update("AAPL")).await, 2);
        // fast listener drains, slow one does not
        drain(&mut rx_fast);
        assert_eq!(hub.publish("AAPL", &update("AAPL")).await, 1);

        assert_eq!(hub.len().await, 2);
        assert_eq!(drain(&mut rx_slow).len(), 1);
        assert_eq!(drain(&mut rx_fast).len(), 1);
    }
}
