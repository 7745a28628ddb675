//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`TicketEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.
//! Publishing happens strictly after the owning database transaction has
//! committed, so subscribers never observe a state that could roll back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use civicdesk_core::types::DbId;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const TICKET_CREATED: &str = "ticket.created";
pub const TICKET_ESCALATED: &str = "ticket.escalated";
pub const TICKET_MESSAGE: &str = "ticket.message";
pub const TICKET_STATUS_CHANGED: &str = "ticket.status_changed";
pub const TICKET_REASSIGNED: &str = "ticket.reassigned";
pub const TICKET_SLA_BREACHED: &str = "ticket.sla_breached";
pub const TICKET_SLA_REMINDER: &str = "ticket.sla_reminder";

// ---------------------------------------------------------------------------
// TicketEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on a ticket.
///
/// Constructed via [`TicketEvent::new`] and enriched with
/// [`with_actor`](TicketEvent::with_actor) and
/// [`with_payload`](TicketEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    /// Dot-separated event name, e.g. `"ticket.escalated"`.
    pub event_type: String,

    /// The ticket this event belongs to.
    pub ticket_id: DbId,

    /// Optional id of the user that triggered the event. `None` for
    /// events raised by the SLA sweeps.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl TicketEvent {
    /// Create a new event with the required fields.
    pub fn new(event_type: impl Into<String>, ticket_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            ticket_id,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TicketEvent`].
pub struct EventBus {
    sender: broadcast::Sender<TicketEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the durable record was already written by the owning transaction.
    pub fn publish(&self, event: TicketEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = TicketEvent::new(TICKET_ESCALATED, 42)
            .with_actor(7)
            .with_payload(serde_json::json!({"escalation_level": 2}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, TICKET_ESCALATED);
        assert_eq!(received.ticket_id, 42);
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["escalation_level"], 2);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(TicketEvent::new(TICKET_MESSAGE, 1));

        assert_eq!(rx1.recv().await.unwrap().ticket_id, 1);
        assert_eq!(rx2.recv().await.unwrap().ticket_id, 1);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(TicketEvent::new(TICKET_CREATED, 9));
    }
}
