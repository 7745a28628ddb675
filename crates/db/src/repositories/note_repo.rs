//! Repository for the `ticket_notes` table.
//!
//! Internal annotation channel; append-only, officer/admin eyes only.

use sqlx::PgPool;

use civicdesk_core::types::DbId;

use crate::models::ticket_note::{NoteWithAuthor, TicketNote};

const COLUMNS: &str = "id, ticket_id, author_id, note, created_at";

pub struct NoteRepo;

impl NoteRepo {
    /// Append an internal note to a ticket.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<NoteWithAuthor, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO ticket_notes (ticket_id, author_id, note) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let note = sqlx::query_as::<_, TicketNote>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(&mut *tx)
            .await?;

        let author_name: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
            .bind(author_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(NoteWithAuthor { note, author_name })
    }

    /// List a ticket's internal notes in creation order.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<NoteWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, NoteWithAuthor>(
            "SELECT n.id, n.ticket_id, n.author_id, n.note, n.created_at, \
                    u.username AS author_name \
             FROM ticket_notes n \
             JOIN users u ON u.id = n.author_id \
             WHERE n.ticket_id = $1 \
             ORDER BY n.created_at ASC, n.id ASC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }
}
