//! The closed set of actor roles.
//!
//! Roles are mutually exclusive tags, not a hierarchy. They are stored as
//! lowercase text in the `users.role` column and embedded as-is in JWT
//! claims; [`Role`] keeps every dispatch on them exhaustive at compile
//! time.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Actor role for every authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum Role {
    Youth,
    Officer,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Admins and super-admins share the full administrative surface.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Wire/database representation (`"youth"`, `"super_admin"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Youth => "youth",
            Role::Officer => "officer",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youth" => Ok(Role::Youth),
            "officer" => Ok(Role::Officer),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(CoreError::Validation(format!("Unknown role: {other}"))),
        }
    }
}
