//! Audit log entity model.

use serde::Serialize;
use sqlx::FromRow;

use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub ticket_id: Option<DbId>,
    pub created_at: Timestamp,
}
