use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use civicdesk_core::channels::{officer_channel, ticket_channel};
use civicdesk_core::error::CoreError;
use civicdesk_core::types::DbId;
use civicdesk_core::visibility::can_view;
use civicdesk_db::repositories::TicketRepo;
use futures::{SinkExt, StreamExt};

use crate::error::{ApiResult, AppError};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOfficer;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Upgrade handler for a ticket's live thread (`/ws/tickets/{id}`).
///
/// Visibility is checked against the ticket before the upgrade completes:
/// a caller who cannot view the ticket gets a 404, exactly as on the REST
/// surface. The check is repeated on every publish, so passing it here is
/// a fast path, not a grant.
pub async fn ticket_ws(
    ws: WebSocketUpgrade,
    user: AuthUser,
    Path(ticket_id): Path<DbId>,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        })?;

    if !can_view(user.role, user.user_id, ticket.youth_id, ticket.officer_id) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }));
    }

    let channel = ticket_channel(ticket_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, user, channel)))
}

/// Upgrade handler for an officer's personal alert stream
/// (`/ws/notifications`). Officer-only; the channel name is derived from the
/// authenticated identity, never from client input.
pub async fn officer_ws(
    ws: WebSocketUpgrade,
    RequireOfficer(user): RequireOfficer,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let channel = officer_channel(user.user_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, user, channel)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and joins its channel.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, user: AuthUser, channel: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, channel = %channel, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = ws_manager.add(conn_id.clone(), user.user_id, user.role).await;
    ws_manager.subscribe(&channel, &conn_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: the stream is read-only for clients; messages are
    // posted over REST so they hit validation and the guards.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection (drops subscriptions) and abort sender task.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
