//! Well-known realtime channel names.
//!
//! Each ticket has a broadcast channel for its conversation thread, and
//! each officer has a personal channel for assignment alerts. These
//! builders are the single source of truth for the naming scheme used by
//! the WebSocket manager and the notification router.

use crate::types::DbId;

/// Broadcast channel for a ticket's conversation thread.
pub fn ticket_channel(ticket_id: DbId) -> String {
    format!("ticket_{ticket_id}")
}

/// Personal notification channel for an officer.
pub fn officer_channel(user_id: DbId) -> String {
    format!("notifications_{user_id}")
}
