//! Handlers for the `/officers` resource.
//!
//! Admin-only officer administration. Deactivated officers stop receiving
//! new assignments and stop resolving as reassignment targets; their
//! existing tickets are untouched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use civicdesk_core::error::CoreError;
use civicdesk_core::types::DbId;
use civicdesk_db::repositories::UserRepo;

use crate::error::{ApiResult, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Body for `PATCH /officers/{id}/active`.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// PATCH /api/v1/officers/{id}/active
///
/// Deactivate or reactivate an officer. Returns 204 No Content on success,
/// or 404 if the id does not name an officer.
pub async fn set_officer_active(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(officer_id): Path<DbId>,
    Json(input): Json<SetActiveRequest>,
) -> ApiResult<impl IntoResponse> {
    let found = UserRepo::set_officer_active(&state.pool, officer_id, input.is_active).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Officer",
            id: officer_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}
