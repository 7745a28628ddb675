//! Internal ticket note models.
//!
//! Same shape as the conversation thread but visible only to the assigned
//! officer and admins; never exposed to the youth role.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `ticket_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketNote {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub note: String,
    pub created_at: Timestamp,
}

/// A note enriched with the author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoteWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub note: TicketNote,
    pub author_name: String,
}

/// DTO for adding a note.
#[derive(Debug, Deserialize)]
pub struct CreateNote {
    pub note: String,
}
