//! Ticket conversation message models.
//!
//! Messages are append-only: there is no update DTO and no update path.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `ticket_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketMessage {
    pub id: DbId,
    pub ticket_id: DbId,
    pub sender_id: DbId,
    pub message: String,
    pub created_at: Timestamp,
}

/// A message enriched with the sender's display name, as returned by the
/// API and pushed over the ticket's realtime channel.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageWithSender {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: TicketMessage,
    pub sender_name: String,
}

/// DTO for posting a message.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub message: String,
}
