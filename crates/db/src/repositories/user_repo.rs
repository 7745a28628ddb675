//! Repository for the `users` table.

use sqlx::PgPool;

use civicdesk_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, phone, role, is_active, created_at, updated_at";

/// Provides read access to user identities plus the inserts the seed and
/// test paths need. Credential management lives in the account service.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, phone, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an active officer by numeric id or username.
    ///
    /// The reassign operation accepts either form; a match must have
    /// `role = 'officer'` and be active, otherwise `None`.
    pub async fn find_active_officer(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        if let Ok(id) = identifier.parse::<DbId>() {
            let query = format!(
                "SELECT {COLUMNS} FROM users \
                 WHERE id = $1 AND role = 'officer' AND is_active = true"
            );
            sqlx::query_as::<_, User>(&query)
                .bind(id)
                .fetch_optional(pool)
                .await
        } else {
            let query = format!(
                "SELECT {COLUMNS} FROM users \
                 WHERE username = $1 AND role = 'officer' AND is_active = true"
            );
            sqlx::query_as::<_, User>(&query)
                .bind(identifier)
                .fetch_optional(pool)
                .await
        }
    }

    /// Deactivate or reactivate an officer (admin surface).
    ///
    /// Returns `true` if a matching officer row was updated.
    pub async fn set_officer_active(
        pool: &PgPool,
        officer_id: DbId,
        is_active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = NOW() \
             WHERE id = $1 AND role = 'officer'",
        )
        .bind(officer_id)
        .bind(is_active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
