pub mod health;
pub mod notification;
pub mod officer;
pub mod ticket;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/tickets/{id}                  ticket thread WebSocket
/// /ws/notifications                 officer alert WebSocket
///
/// /tickets                          list, create
/// /tickets/unassigned               unassigned queue (admin)
/// /tickets/stats                    status counts (admin)
/// /tickets/{id}                     get
/// /tickets/{id}/escalate            escalate (POST)
/// /tickets/{id}/reassign            reassign (POST, admin)
/// /tickets/{id}/status              update status (PATCH)
/// /tickets/{id}/messages            list, post
/// /tickets/{id}/notes               list, post (officer/admin)
///
/// /officers/{id}/active             activate/deactivate (PATCH, admin)
///
/// /notifications                    list (?unread_only, limit, offset)
/// /notifications/read-all           mark all read (POST)
/// /notifications/unread-count       unread count (GET)
/// /notifications/{id}/read          mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoints.
        .route("/ws/tickets/{id}", get(ws::handler::ticket_ws))
        .route("/ws/notifications", get(ws::handler::officer_ws))
        // Ticket lifecycle, conversation, and notes.
        .nest("/tickets", ticket::router())
        // Officer administration.
        .nest("/officers", officer::router())
        // In-app notification inbox.
        .nest("/notifications", notification::router())
}
