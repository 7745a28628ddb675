//! Notification entity model.

use serde::Serialize;
use sqlx::FromRow;

use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `notifications` table -- the durable half of the
/// notification dispatcher, decoupled from realtime delivery.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}
