//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use civicdesk_core::roles::Role;
use civicdesk_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// Registration and credential handling live in the account service; this
/// crate only reads the identity, role, and contact fields the ticket
/// engine needs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Officers with `is_active = false` are excluded from assignment.
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user (seed data and tests).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}
