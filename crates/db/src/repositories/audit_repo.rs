//! Repository for the `audit_log` table.

use sqlx::PgPool;

use civicdesk_core::types::DbId;

use crate::models::audit::AuditEntry;

const COLUMNS: &str = "id, user_id, action, ticket_id, created_at";

pub struct AuditRepo;

impl AuditRepo {
    /// Record an action, optionally attributed to a user and a ticket.
    pub async fn record(
        pool: &PgPool,
        user_id: Option<DbId>,
        action: &str,
        ticket_id: Option<DbId>,
    ) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log (user_id, action, ticket_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(user_id)
            .bind(action)
            .bind(ticket_id)
            .fetch_one(pool)
            .await
    }

    /// List the audit trail for a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log \
             WHERE ticket_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
