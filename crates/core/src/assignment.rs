//! Least-workload officer assignment.
//!
//! A pure query over the current officer set, evaluated at call time. The
//! persistence layer gathers the candidates inside the ticket-creation
//! transaction and hands them here; under concurrent creations the counts
//! we see may be one ticket stale, which only ever skews the choice by a
//! single assignment and never faults.

use crate::types::{DbId, Timestamp};

/// One active officer as seen by the assignment policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerCandidate {
    pub user_id: DbId,
    /// Count of this officer's tickets with status open or in_progress.
    pub active_tickets: i64,
    /// Account creation time; earlier wins ties.
    pub created_at: Timestamp,
}

/// Select the least-loaded officer; ties break to the earliest-created
/// account (approximating round-robin fairness over time).
///
/// Returns `None` when no active officer exists -- the ticket is still
/// creatable and stays unassigned.
pub fn select_officer(candidates: &[OfficerCandidate]) -> Option<DbId> {
    candidates
        .iter()
        .min_by_key(|c| (c.active_tickets, c.created_at))
        .map(|c| c.user_id)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn candidate(user_id: DbId, active_tickets: i64, joined_secs: i64) -> OfficerCandidate {
        OfficerCandidate {
            user_id,
            active_tickets,
            created_at: Utc.timestamp_opt(joined_secs, 0).unwrap(),
        }
    }

    #[test]
    fn picks_the_least_loaded_officer() {
        let candidates = [candidate(1, 4, 100), candidate(2, 1, 200), candidate(3, 3, 50)];
        assert_eq!(select_officer(&candidates), Some(2));
    }

    #[test]
    fn ties_break_to_earliest_account() {
        let candidates = [candidate(1, 2, 300), candidate(2, 2, 100), candidate(3, 2, 200)];
        assert_eq!(select_officer(&candidates), Some(2));
    }

    #[test]
    fn result_always_has_minimum_workload() {
        let candidates = [
            candidate(1, 7, 10),
            candidate(2, 0, 900),
            candidate(3, 5, 20),
            candidate(4, 0, 901),
        ];
        let min = candidates.iter().map(|c| c.active_tickets).min().unwrap();
        let chosen = select_officer(&candidates).unwrap();
        let chosen = candidates.iter().find(|c| c.user_id == chosen).unwrap();
        assert_eq!(chosen.active_tickets, min);
        // Among the zero-load pair, the older account wins.
        assert_eq!(chosen.user_id, 2);
    }

    #[test]
    fn no_officers_means_unassigned() {
        assert_eq!(select_officer(&[]), None);
    }
}
