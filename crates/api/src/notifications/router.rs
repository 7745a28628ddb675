//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the ticket event bus and performs
//! the deferred side-effect work for each event: WebSocket fan-out,
//! persisted in-app notifications, off-band delivery to the youth, and the
//! audit trail. Running it here, off the request path, means a slow SMTP
//! server or gateway never delays an HTTP response.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use civicdesk_core::channels::ticket_channel;
use civicdesk_core::types::DbId;
use civicdesk_db::repositories::AuditRepo;
use civicdesk_db::DbPool;
use civicdesk_events::bus::{
    TicketEvent, TICKET_CREATED, TICKET_ESCALATED, TICKET_MESSAGE, TICKET_REASSIGNED,
    TICKET_SLA_BREACHED, TICKET_SLA_REMINDER, TICKET_STATUS_CHANGED,
};
use civicdesk_events::dispatcher::{Dispatcher, ExternalChannel};

use crate::ws::WsManager;

/// Routes ticket events to their notification side effects.
///
/// Consumes events from the broadcast channel; every failure is logged and
/// swallowed, so one bad event never stops the loop and the originating
/// request is never affected.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    dispatcher: Arc<Dispatcher>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            pool,
            ws_manager,
            dispatcher,
        }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](civicdesk_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<TicketEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            ticket_id = event.ticket_id,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to its side effects.
    async fn route_event(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        match event.event_type.as_str() {
            TICKET_CREATED => self.on_created(event).await,
            TICKET_ESCALATED => self.on_escalated(event).await,
            TICKET_MESSAGE => self.on_message(event).await,
            TICKET_STATUS_CHANGED => self.on_status_changed(event).await,
            TICKET_REASSIGNED => self.on_reassigned(event).await,
            TICKET_SLA_BREACHED => self.on_sla_breached(event).await,
            TICKET_SLA_REMINDER => self.on_sla_reminder(event).await,
            other => {
                tracing::debug!(event_type = other, "No route for event type");
                Ok(())
            }
        }
    }

    /// New ticket: alert the auto-assigned officer, if any, and start the
    /// audit trail.
    async fn on_created(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        let title = payload_str(event, "title");

        if let Some(officer_id) = payload_id(event, "officer_id") {
            self.dispatcher
                .notify(officer_id, &format!("New ticket assigned: {title}"))
                .await?;
            self.push_officer(officer_id, event).await;
        }

        AuditRepo::record(
            &self.pool,
            event.actor_user_id,
            "Ticket created",
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    /// Escalation: fan the system message out to the ticket thread and tell
    /// the youth off-band. Delivery is best-effort; an unconfigured or
    /// failing gateway only logs.
    async fn on_escalated(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        self.push_ticket(event).await;

        let level = event
            .payload
            .get("escalation_level")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let title = payload_str(event, "title");

        if let Some(youth_id) = payload_id(event, "youth_id") {
            if let Some(phone) = self.youth_phone(youth_id).await {
                self.dispatcher
                    .send_external(
                        ExternalChannel::WhatsApp,
                        &phone,
                        &format!("Your ticket '{title}' has been escalated to Level {level}."),
                    )
                    .await;
            }
        }

        AuditRepo::record(
            &self.pool,
            event.actor_user_id,
            &format!("Ticket escalated to Level {level}"),
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    /// Conversation message: fan out to the ticket thread subscribers.
    async fn on_message(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        self.push_ticket(event).await;
        Ok(())
    }

    /// Status change: persist an in-app notification for the youth and
    /// record the audit entry.
    async fn on_status_changed(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        let title = payload_str(event, "title");
        let status = payload_str(event, "status");

        if let Some(youth_id) = payload_id(event, "youth_id") {
            self.dispatcher
                .notify(
                    youth_id,
                    &format!("Your ticket '{title}' is now {status}"),
                )
                .await?;
        }

        AuditRepo::record(
            &self.pool,
            event.actor_user_id,
            &format!("Ticket status changed to {status}"),
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    /// Reassignment: alert the new officer, tell the youth, audit.
    async fn on_reassigned(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        let title = payload_str(event, "title");
        let officer_name = payload_str(event, "officer_name");

        if let Some(officer_id) = payload_id(event, "officer_id") {
            self.dispatcher
                .notify(officer_id, &format!("New ticket assigned: {title}"))
                .await?;
            self.push_officer(officer_id, event).await;
        }
        if let Some(youth_id) = payload_id(event, "youth_id") {
            self.dispatcher
                .notify(
                    youth_id,
                    &format!("Your ticket '{title}' has been reassigned to {officer_name}"),
                )
                .await?;
        }

        AuditRepo::record(
            &self.pool,
            event.actor_user_id,
            &format!("Ticket reassigned to {officer_name}"),
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    /// SLA breach: alert the assigned officer, if any, and audit. The sweep
    /// already raised the escalation level; nothing to write here.
    async fn on_sla_breached(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        let title = payload_str(event, "title");

        if let Some(officer_id) = payload_id(event, "officer_id") {
            self.dispatcher
                .notify(
                    officer_id,
                    &format!("SLA deadline breached on ticket: {title}"),
                )
                .await?;
            self.push_officer(officer_id, event).await;
        }

        AuditRepo::record(
            &self.pool,
            None,
            "SLA breach auto-escalated ticket",
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    /// SLA reminder: reach the youth through every configured off-band
    /// channel. The sweep stamped the ticket, so this fires once.
    async fn on_sla_reminder(&self, event: &TicketEvent) -> Result<(), sqlx::Error> {
        let title = payload_str(event, "title");
        let body = format!(
            "Reminder: your ticket '{title}' is approaching its resolution deadline."
        );

        if let Some(phone) = event.payload.get("phone").and_then(|v| v.as_str()) {
            self.dispatcher
                .send_external(ExternalChannel::WhatsApp, phone, &body)
                .await;
            self.dispatcher
                .send_external(ExternalChannel::Sms, phone, &body)
                .await;
        }
        if let Some(email) = event.payload.get("email").and_then(|v| v.as_str()) {
            self.dispatcher
                .send_external(ExternalChannel::Email, email, &body)
                .await;
        }

        AuditRepo::record(
            &self.pool,
            None,
            "SLA deadline reminder sent",
            Some(event.ticket_id),
        )
        .await?;
        Ok(())
    }

    // -- helpers ----------------------------------------------------------

    /// Push an event to the ticket's thread channel; subscriber visibility
    /// is re-checked by the manager against the participants carried in the
    /// payload.
    async fn push_ticket(&self, event: &TicketEvent) {
        let Some(youth_id) = payload_id(event, "youth_id") else {
            tracing::warn!(ticket_id = event.ticket_id, "Event payload missing youth_id");
            return;
        };
        let officer_id = payload_id(event, "officer_id");

        let channel = ticket_channel(event.ticket_id);
        let sent = self
            .ws_manager
            .publish_ticket(&channel, youth_id, officer_id, ws_message(event))
            .await;
        tracing::debug!(channel = %channel, sent, "Fanned out ticket event");
    }

    /// Push an event to an officer's personal alert channel.
    async fn push_officer(&self, officer_id: DbId, event: &TicketEvent) {
        let sent = self
            .ws_manager
            .publish_officer(officer_id, ws_message(event))
            .await;
        tracing::debug!(officer_id, sent, "Fanned out officer alert");
    }

    /// Look up a youth's phone number, if on file.
    async fn youth_phone(&self, youth_id: DbId) -> Option<String> {
        sqlx::query_scalar::<_, Option<String>>("SELECT phone FROM users WHERE id = $1")
            .bind(youth_id)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .flatten()
    }
}

/// Serialize an event as the WebSocket text frame pushed to clients.
fn ws_message(event: &TicketEvent) -> Message {
    let msg = serde_json::json!({
        "type": event.event_type,
        "ticket_id": event.ticket_id,
        "payload": event.payload,
        "timestamp": event.timestamp,
    });
    Message::Text(msg.to_string().into())
}

/// Read a string field from the event payload, defaulting to empty.
fn payload_str<'a>(event: &'a TicketEvent, key: &str) -> &'a str {
    event.payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Read an id field from the event payload. Absent and JSON-null are both
/// `None`, matching an unassigned officer slot.
fn payload_id(event: &TicketEvent, key: &str) -> Option<DbId> {
    event.payload.get(key).and_then(|v| v.as_i64())
}
