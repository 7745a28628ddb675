//! Repository for the `ticket_messages` table.
//!
//! The conversation thread is append-only; there is no update or delete.

use sqlx::PgPool;

use civicdesk_core::types::DbId;

use crate::models::ticket_message::{MessageWithSender, TicketMessage};

const COLUMNS: &str = "id, ticket_id, sender_id, message, created_at";

pub struct MessageRepo;

impl MessageRepo {
    /// Append a message to a ticket's conversation thread.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        sender_id: DbId,
        body: &str,
    ) -> Result<MessageWithSender, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO ticket_messages (ticket_id, sender_id, message) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, TicketMessage>(&query)
            .bind(ticket_id)
            .bind(sender_id)
            .bind(body)
            .fetch_one(&mut *tx)
            .await?;

        let sender_name: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
            .bind(sender_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(MessageWithSender {
            message,
            sender_name,
        })
    }

    /// List a ticket's messages in creation order.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<MessageWithSender>, sqlx::Error> {
        sqlx::query_as::<_, MessageWithSender>(
            "SELECT m.id, m.ticket_id, m.sender_id, m.message, m.created_at, \
                    u.username AS sender_name \
             FROM ticket_messages m \
             JOIN users u ON u.id = m.sender_id \
             WHERE m.ticket_id = $1 \
             ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }
}
