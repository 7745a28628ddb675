//! SLA deadline arithmetic.
//!
//! Deadlines are set once at ticket creation. The breach and reminder
//! sweeps in `civicdesk-events` are two independent queries; the
//! predicates they evaluate live here so both sides agree on the window
//! boundaries.

use chrono::Duration;

use crate::types::Timestamp;

/// Hours from creation to the SLA deadline.
pub const SLA_DEADLINE_HOURS: i64 = 72;

/// Lookahead window for deadline reminders.
pub const REMINDER_LOOKAHEAD_HOURS: i64 = 24;

/// Compute the SLA deadline for a ticket created at `created_at`.
pub fn deadline_for(created_at: Timestamp) -> Timestamp {
    created_at + Duration::hours(SLA_DEADLINE_HOURS)
}

/// Has the deadline passed as of `now`?
pub fn is_breached(deadline: Timestamp, now: Timestamp) -> bool {
    deadline <= now
}

/// Is the deadline inside the reminder lookahead window as of `now`?
///
/// Already-breached deadlines are excluded; those belong to the breach
/// sweep, not the reminder sweep.
pub fn needs_reminder(deadline: Timestamp, now: Timestamp) -> bool {
    deadline > now && deadline <= now + Duration::hours(REMINDER_LOOKAHEAD_HOURS)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn deadline_is_72_hours_after_creation() {
        let created = at(1_000_000);
        assert_eq!(deadline_for(created) - created, Duration::hours(72));
    }

    #[test]
    fn breach_is_inclusive_of_the_deadline_instant() {
        let deadline = at(5_000);
        assert!(is_breached(deadline, at(5_000)));
        assert!(is_breached(deadline, at(5_001)));
        assert!(!is_breached(deadline, at(4_999)));
    }

    #[test]
    fn reminder_window_excludes_breached_and_distant_deadlines() {
        let now = at(0);
        let hour = 3_600;
        assert!(needs_reminder(at(hour), now));
        assert!(needs_reminder(at(24 * hour), now));
        assert!(!needs_reminder(at(25 * hour), now));
        // On or before now: breached, not reminder territory.
        assert!(!needs_reminder(at(0), now));
        assert!(!needs_reminder(at(-hour), now));
    }
}
