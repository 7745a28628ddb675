//! Ticket entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civicdesk_core::ticket::{EscalationLevel, TicketStatus};
use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    /// Owner; exactly one, immutable after creation.
    pub youth_id: DbId,
    /// Assigned officer; null only while no auto-assignment was possible.
    pub officer_id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: TicketStatus,
    pub escalation_level: EscalationLevel,
    /// Set once at creation to `created_at + 72h`.
    pub sla_deadline: Timestamp,
    /// One-shot reminder marker for the SLA reminder sweep.
    pub last_reminded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A ticket enriched with display names, as returned by the API.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketWithNames {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub youth_name: String,
    pub officer_name: Option<String>,
}

/// DTO for creating a ticket. Status, escalation level, officer, and
/// deadline are never caller-supplied; the engine sets them.
#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

/// A ticket touched by the SLA breach sweep, carrying what the
/// notification path needs.
#[derive(Debug, Clone, FromRow)]
pub struct BreachedTicket {
    pub id: DbId,
    pub youth_id: DbId,
    pub officer_id: Option<DbId>,
    pub title: String,
    pub escalation_level: EscalationLevel,
}

/// A ticket picked up by the reminder sweep, joined with the youth's
/// contact details.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderTicket {
    pub id: DbId,
    pub youth_id: DbId,
    pub title: String,
    pub sla_deadline: Timestamp,
    pub phone: Option<String>,
    pub email: String,
}
