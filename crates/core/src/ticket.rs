//! Ticket state machine: statuses, escalation levels, and the guards
//! every mutating operation must pass.
//!
//! The state machine itself is deliberately small: `open -> in_progress ->
//! resolved`, with the escalation level as an orthogonal 1..=3 counter that
//! never decreases. The persistence layer applies these rules inside a
//! transaction; this module only decides, it never writes.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Maximum length of a ticket title.
const MAX_TITLE_LEN: usize = 255;

/// Maximum length of a ticket category.
const MAX_CATEGORY_LEN: usize = 80;

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a ticket. `Resolved` is terminal, but the row is
/// retained for audit and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(CoreError::Validation(format!("Invalid status: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// EscalationLevel
// ---------------------------------------------------------------------------

/// Escalation level 1..=3, monotonically non-decreasing.
///
/// Stored as SMALLINT. There is no reset operation; the only mutations are
/// [`bump`](Self::bump) and [`at_least`](Self::at_least), both of which cap
/// at [`EscalationLevel::MAX`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct EscalationLevel(i16);

impl EscalationLevel {
    /// Initial level for every new ticket.
    pub const L1: EscalationLevel = EscalationLevel(1);

    /// Level forced by an SLA breach.
    pub const BREACHED: EscalationLevel = EscalationLevel(2);

    /// Highest level; further escalations are no-ops on the counter.
    pub const MAX: EscalationLevel = EscalationLevel(3);

    /// Validate a raw database value.
    pub fn new(raw: i16) -> Result<Self, CoreError> {
        if (1..=3).contains(&raw) {
            Ok(EscalationLevel(raw))
        } else {
            Err(CoreError::Validation(format!(
                "Escalation level must be 1..=3, got {raw}"
            )))
        }
    }

    pub fn get(self) -> i16 {
        self.0
    }

    /// Increment by one, capped at [`MAX`](Self::MAX).
    pub fn bump(self) -> Self {
        EscalationLevel((self.0 + 1).min(Self::MAX.0))
    }

    /// Raise to `floor` if currently below it; never lowers.
    pub fn at_least(self, floor: EscalationLevel) -> Self {
        self.max(floor)
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Guard for the escalate operation: the assigned officer or any admin.
///
/// Youths cannot escalate their own tickets, and an officer who is not
/// assigned to the ticket is rejected without revealing anything further.
pub fn can_escalate(
    role: Role,
    actor_id: DbId,
    officer_id: Option<DbId>,
) -> Result<(), CoreError> {
    if role.is_admin() {
        return Ok(());
    }
    if role == Role::Officer && officer_id == Some(actor_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "You cannot escalate this ticket".into(),
    ))
}

/// Guard for status updates: same membership as escalation.
pub fn can_update_status(
    role: Role,
    actor_id: DbId,
    officer_id: Option<DbId>,
) -> Result<(), CoreError> {
    if role.is_admin() {
        return Ok(());
    }
    if role == Role::Officer && officer_id == Some(actor_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden("You cannot update this ticket".into()))
}

/// Guard for posting to the youth-visible conversation thread: the ticket's
/// owner-youth, its assigned officer, or any admin.
pub fn can_post_message(
    role: Role,
    actor_id: DbId,
    youth_id: DbId,
    officer_id: Option<DbId>,
) -> Result<(), CoreError> {
    let allowed = match role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Youth => youth_id == actor_id,
        Role::Officer => officer_id == Some(actor_id),
    };
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You cannot message this ticket".into(),
        ))
    }
}

/// Guard for the internal notes thread: assigned officer or any admin.
/// Notes are never visible to the youth role under any path.
pub fn can_access_notes(
    role: Role,
    actor_id: DbId,
    officer_id: Option<DbId>,
) -> Result<(), CoreError> {
    let allowed = match role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Officer => officer_id == Some(actor_id),
        Role::Youth => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Internal notes are restricted to the assigned officer and admins".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Validate the caller-supplied fields of a new ticket.
pub fn validate_new_ticket(title: &str, description: &str, category: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must not exceed {MAX_TITLE_LEN} characters"
        )));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "Description must not be empty".into(),
        ));
    }
    if category.trim().is_empty() {
        return Err(CoreError::Validation("Category must not be empty".into()));
    }
    if category.len() > MAX_CATEGORY_LEN {
        return Err(CoreError::Validation(format!(
            "Category must not exceed {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a message or note body.
pub fn validate_message_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Message must not be empty".into()));
    }
    Ok(())
}

/// System message appended to the conversation thread when a ticket is
/// escalated.
pub fn escalation_notice(level: EscalationLevel) -> String {
    format!("Ticket escalated to Level {}", level.get())
}
