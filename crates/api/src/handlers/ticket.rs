//! Handlers for the `/tickets` resource.
//!
//! Handlers validate input, call the repository (which runs the guards
//! inside its transactions), and publish an event to the bus only after
//! the commit has returned. Fan-out and notification delivery happen in
//! the background consumers, never on the request path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use civicdesk_core::error::CoreError;
use civicdesk_core::ticket::{self, TicketStatus};
use civicdesk_core::types::DbId;
use civicdesk_core::visibility::can_view;
use civicdesk_db::models::ticket::CreateTicket;
use civicdesk_db::models::ticket_message::CreateMessage;
use civicdesk_db::models::ticket_note::CreateNote;
use civicdesk_db::repositories::{AuditRepo, MessageRepo, NoteRepo, TicketRepo, UserRepo};
use civicdesk_events::bus::{
    TicketEvent, TICKET_CREATED, TICKET_ESCALATED, TICKET_MESSAGE, TICKET_REASSIGNED,
    TICKET_STATUS_CHANGED,
};

use crate::error::{ApiResult, AppError};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireYouth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /tickets/{id}/reassign`.
#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    /// Target officer, by numeric id or username.
    pub officer: String,
}

/// Body for `PATCH /tickets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets
///
/// Open a new ticket as the authenticated youth. Assignment runs inside
/// the creation transaction; the ticket comes back either assigned to the
/// least-loaded active officer or unassigned if none exists.
pub async fn create_ticket(
    RequireYouth(user): RequireYouth,
    State(state): State<AppState>,
    Json(input): Json<CreateTicket>,
) -> ApiResult<impl IntoResponse> {
    ticket::validate_new_ticket(&input.title, &input.description, &input.category)?;

    let created = TicketRepo::create_assigned(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        ticket_id = created.id,
        youth_id = user.user_id,
        officer_id = ?created.officer_id,
        "ticket created"
    );

    state.event_bus.publish(
        TicketEvent::new(TICKET_CREATED, created.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "title": created.title,
                "youth_id": created.youth_id,
                "officer_id": created.officer_id,
            })),
    );

    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

/// GET /api/v1/tickets
///
/// List tickets visible to the caller: admins see everything, officers
/// their assignments, youths their own.
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let tickets = TicketRepo::list_for(&state.pool, auth.role, auth.user_id).await?;
    Ok(Json(json!({ "data": tickets })))
}

/// GET /api/v1/tickets/my-tickets
///
/// Convenience listing for youth clients; same visibility predicate as
/// the general list.
pub async fn my_tickets(
    RequireYouth(user): RequireYouth,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let tickets = TicketRepo::list_for(&state.pool, user.role, user.user_id).await?;
    Ok(Json(json!({ "data": tickets })))
}

/// GET /api/v1/tickets/{id}
///
/// Fetch one ticket with participant display names. A ticket outside the
/// caller's visibility is indistinguishable from a missing one.
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> ApiResult<Json<serde_json::Value>> {
    let ticket = TicketRepo::find_with_names(&state.pool, ticket_id)
        .await?
        .filter(|t| can_view(auth.role, auth.user_id, t.ticket.youth_id, t.ticket.officer_id))
        .ok_or(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        })?;
    Ok(Json(json!({ "data": ticket })))
}

/// GET /api/v1/tickets/unassigned
///
/// Admin surface: tickets waiting for a manual assignment.
pub async fn unassigned_tickets(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let tickets = TicketRepo::list_unassigned(&state.pool).await?;
    Ok(Json(json!({ "data": tickets })))
}

/// GET /api/v1/tickets/stats
///
/// Admin surface: aggregate status counts.
pub async fn ticket_stats(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let stats = TicketRepo::stats(&state.pool).await?;
    Ok(Json(json!({ "data": stats })))
}

/// GET /api/v1/tickets/{id}/audit
///
/// Audit trail for one ticket, oldest first. Admin only; the trail records
/// actor ids, so it is never exposed to participants.
pub async fn ticket_audit(
    RequireAdmin(_user): RequireAdmin,
    Path(ticket_id): Path<DbId>,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        })?;
    let entries = AuditRepo::list_for_ticket(&state.pool, ticket_id).await?;
    Ok(Json(json!({ "data": entries })))
}

/// POST /api/v1/tickets/{id}/escalate
///
/// Raise the escalation level (capped at 3), force status to in_progress,
/// and append the system message, all in one transaction. Allowed for the
/// assigned officer and admins.
pub async fn escalate_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> ApiResult<Json<serde_json::Value>> {
    let (updated, notice) =
        TicketRepo::escalate(&state.pool, ticket_id, auth.user_id, auth.role).await?;

    tracing::info!(
        ticket_id,
        actor_id = auth.user_id,
        level = updated.escalation_level.get(),
        "ticket escalated"
    );

    state.event_bus.publish(
        TicketEvent::new(TICKET_ESCALATED, ticket_id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "title": updated.title,
                "youth_id": updated.youth_id,
                "officer_id": updated.officer_id,
                "escalation_level": updated.escalation_level,
                "message": notice,
            })),
    );

    Ok(Json(json!({
        "data": { "ticket": updated, "system_message": notice }
    })))
}

/// POST /api/v1/tickets/{id}/reassign
///
/// Admin-only. Resolves the target officer by id or username; an unknown,
/// inactive, or non-officer target is a 404, not a silent unassignment.
pub async fn reassign_ticket(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<ReassignRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let identifier = input.officer.trim();
    if identifier.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Officer identifier must not be empty".into(),
        )));
    }

    let officer = UserRepo::find_active_officer(&state.pool, identifier)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No active officer matches '{identifier}'")))?;

    let updated = TicketRepo::reassign(&state.pool, ticket_id, officer.id).await?;

    tracing::info!(
        ticket_id,
        officer_id = officer.id,
        admin_id = user.user_id,
        "ticket reassigned"
    );

    state.event_bus.publish(
        TicketEvent::new(TICKET_REASSIGNED, ticket_id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "title": updated.title,
                "youth_id": updated.youth_id,
                "officer_id": officer.id,
                "officer_name": officer.username,
            })),
    );

    Ok(Json(json!({ "data": updated })))
}

/// PATCH /api/v1/tickets/{id}/status
///
/// Set the ticket status. Allowed for the assigned officer and admins;
/// unknown status strings are a validation error before any read.
pub async fn update_ticket_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let new_status: TicketStatus = input.status.parse().map_err(AppError::Core)?;

    let updated =
        TicketRepo::update_status(&state.pool, ticket_id, auth.user_id, auth.role, new_status)
            .await?;

    state.event_bus.publish(
        TicketEvent::new(TICKET_STATUS_CHANGED, ticket_id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "title": updated.title,
                "youth_id": updated.youth_id,
                "status": updated.status,
            })),
    );

    Ok(Json(json!({ "data": updated })))
}

// ---------------------------------------------------------------------------
// Conversation thread
// ---------------------------------------------------------------------------

/// GET /api/v1/tickets/{id}/messages
///
/// The youth-visible conversation thread, oldest first. Readable by anyone
/// who can view the ticket.
pub async fn list_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> ApiResult<Json<serde_json::Value>> {
    let t = fetch_visible(&state, &auth, ticket_id).await?;
    let messages = MessageRepo::list_for_ticket(&state.pool, t.id).await?;
    Ok(Json(json!({ "data": messages })))
}

/// POST /api/v1/tickets/{id}/messages
///
/// Append to the conversation thread. Restricted to the ticket's
/// participants (owner-youth, assigned officer, admins).
pub async fn post_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> ApiResult<impl IntoResponse> {
    ticket::validate_message_body(&input.message)?;

    let t = fetch_visible(&state, &auth, ticket_id).await?;
    ticket::can_post_message(auth.role, auth.user_id, t.youth_id, t.officer_id)?;

    let created = MessageRepo::create(&state.pool, t.id, auth.user_id, &input.message).await?;

    state.event_bus.publish(
        TicketEvent::new(TICKET_MESSAGE, t.id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "youth_id": t.youth_id,
                "officer_id": t.officer_id,
                "message": created,
            })),
    );

    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

// ---------------------------------------------------------------------------
// Internal notes
// ---------------------------------------------------------------------------

/// GET /api/v1/tickets/{id}/notes
///
/// The internal notes thread. Never visible to the youth role.
pub async fn list_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> ApiResult<Json<serde_json::Value>> {
    let t = fetch_visible(&state, &auth, ticket_id).await?;
    ticket::can_access_notes(auth.role, auth.user_id, t.officer_id)?;

    let notes = NoteRepo::list_for_ticket(&state.pool, t.id).await?;
    Ok(Json(json!({ "data": notes })))
}

/// POST /api/v1/tickets/{id}/notes
pub async fn add_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<CreateNote>,
) -> ApiResult<impl IntoResponse> {
    ticket::validate_message_body(&input.note)?;

    let t = fetch_visible(&state, &auth, ticket_id).await?;
    ticket::can_access_notes(auth.role, auth.user_id, t.officer_id)?;

    let created = NoteRepo::create(&state.pool, t.id, auth.user_id, &input.note).await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a ticket the caller is allowed to see, or 404 either way.
async fn fetch_visible(
    state: &AppState,
    auth: &AuthUser,
    ticket_id: DbId,
) -> Result<civicdesk_db::models::ticket::Ticket, AppError> {
    TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .filter(|t| can_view(auth.role, auth.user_id, t.youth_id, t.officer_id))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Ticket",
                id: ticket_id,
            })
        })
}
