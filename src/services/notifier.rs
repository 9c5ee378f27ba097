//! Notification sink
//!
//! The circulation services publish typed events; delivery is whatever
//! subscribes. Publishing is fire-and-forget: a slow or absent subscriber
//! never fails the operation that produced the event.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::models::event::CirculationEvent;

/// Collaborator interface consumed by the circulation services
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: CirculationEvent);
}

/// In-process sink backed by a broadcast channel, fanned out to SSE clients
pub struct BroadcastNotifier {
    sender: broadcast::Sender<CirculationEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CirculationEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotifier {
    async fn publish(&self, event: CirculationEvent) {
        tracing::debug!(kind = event.kind.as_str(), "publishing circulation event");
        // send only errors when nobody is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventKind;
    use chrono::Utc;

    fn event(kind: EventKind) -> CirculationEvent {
        CirculationEvent {
            kind,
            user_id: 1,
            library_id: 1,
            title_id: 1,
            request_id: Some(1),
            record_id: None,
            copy_id: None,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_fail() {
        let notifier = BroadcastNotifier::new(16);
        notifier.publish(event(EventKind::RequestApproved)).await;
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let notifier = BroadcastNotifier::new(16);
        let mut rx = notifier.subscribe();
        notifier.publish(event(EventKind::LoanReturned)).await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, EventKind::LoanReturned);
    }
}
