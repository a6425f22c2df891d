use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

const BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    pub seq: i64,
    pub category: String,
    pub event_type: String,
    pub workspace: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: String,
}

pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
    seq: AtomicI64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            seq: AtomicI64::new(0),
        }
    }

    /// Publish a pre-built event onto the bus.
    pub fn publish(&self, event: BusEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("event dropped, no subscribers: {}", e.0.event_type);
        }
    }

    /// Build and publish an event in one call. `event_type` is a dotted topic
    /// such as `file.written`; its first segment becomes the category.
    pub fn emit(
        &self,
        event_type: &str,
        workspace: Option<String>,
        payload: serde_json::Value,
    ) -> BusEvent {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let category = event_type
            .split_once('.')
            .map(|(category, _)| category)
            .unwrap_or(event_type);
        let event = BusEvent {
            id: Uuid::new_v4().to_string(),
            seq,
            category: category.to_string(),
            event_type: event_type.to_string(),
            workspace,
            payload,
            created_at: Utc::now().to_rfc3339(),
        };
        self.publish(event.clone());
        event
    }

    /// Get a new receiver for this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events_in_sequence() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit("file.written", Some("/ws".into()), serde_json::json!({"path": "a.txt"}));
        bus.emit("changes.applied", Some("/ws".into()), serde_json::json!({"applied": 1}));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.category, "file");
        assert_eq!(first.payload["path"], "a.txt");
        assert_eq!(second.event_type, "changes.applied");
        assert!(second.seq > first.seq);
    }

    #[test]
    fn emitting_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        let event = bus.emit("workspace.opened", None, serde_json::json!({}));
        assert_eq!(event.category, "workspace");
        assert_eq!(event.seq, 0);
    }
}
