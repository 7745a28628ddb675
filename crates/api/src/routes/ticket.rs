//! Route definitions for the `/tickets` resource.
//!
//! All endpoints require authentication; per-route role requirements are
//! enforced by the handler extractors.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::ticket;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                  -> list_tickets (role-scoped)
/// POST   /                  -> create_ticket (youth only)
/// GET    /my-tickets        -> my_tickets (youth only)
/// GET    /unassigned        -> unassigned_tickets (admin only)
/// GET    /stats             -> ticket_stats (admin only)
/// GET    /{id}              -> get_ticket
/// GET    /{id}/audit        -> ticket_audit (admin only)
/// POST   /{id}/escalate     -> escalate_ticket (assigned officer / admin)
/// POST   /{id}/reassign     -> reassign_ticket (admin only)
/// PATCH  /{id}/status       -> update_ticket_status (assigned officer / admin)
/// GET    /{id}/messages     -> list_messages
/// POST   /{id}/messages     -> post_message (participants)
/// GET    /{id}/notes        -> list_notes (assigned officer / admin)
/// POST   /{id}/notes        -> add_note (assigned officer / admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ticket::list_tickets).post(ticket::create_ticket))
        .route("/my-tickets", get(ticket::my_tickets))
        .route("/unassigned", get(ticket::unassigned_tickets))
        .route("/stats", get(ticket::ticket_stats))
        .route("/{id}", get(ticket::get_ticket))
        .route("/{id}/audit", get(ticket::ticket_audit))
        .route("/{id}/escalate", post(ticket::escalate_ticket))
        .route("/{id}/reassign", post(ticket::reassign_ticket))
        .route("/{id}/status", patch(ticket::update_ticket_status))
        .route(
            "/{id}/messages",
            get(ticket::list_messages).post(ticket::post_message),
        )
        .route("/{id}/notes", get(ticket::list_notes).post(ticket::add_note))
}
