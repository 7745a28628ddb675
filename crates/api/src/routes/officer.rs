//! Route definitions for the `/officers` resource.

use axum::routing::patch;
use axum::Router;

use crate::handlers::officer;
use crate::state::AppState;

/// Routes mounted at `/officers`.
///
/// ```text
/// PATCH  /{id}/active       -> set_officer_active (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/active", patch(officer::set_officer_active))
}
