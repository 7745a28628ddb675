//! Role-scoped ticket visibility.
//!
//! A pure predicate from (actor role, actor id) to ticket membership:
//! admins see everything, an officer sees tickets assigned to them, a
//! youth sees their own tickets. Applied before every list/detail fetch,
//! re-checked per mutation, and re-checked on every realtime push so a
//! subscriber cannot outlive a reassignment.

use crate::roles::Role;
use crate::types::DbId;

/// May `actor` see the ticket owned by `youth_id` and assigned to
/// `officer_id`?
pub fn can_view(role: Role, actor_id: DbId, youth_id: DbId, officer_id: Option<DbId>) -> bool {
    match role {
        Role::Admin | Role::SuperAdmin => true,
        Role::Officer => officer_id == Some(actor_id),
        Role::Youth => youth_id == actor_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_see_all_tickets() {
        assert!(can_view(Role::Admin, 99, 1, Some(2)));
        assert!(can_view(Role::SuperAdmin, 99, 1, None));
    }

    #[test]
    fn officer_sees_only_assigned_tickets() {
        assert!(can_view(Role::Officer, 2, 1, Some(2)));
        assert!(!can_view(Role::Officer, 2, 1, Some(3)));
        assert!(!can_view(Role::Officer, 2, 1, None));
    }

    #[test]
    fn youth_sees_only_own_tickets() {
        assert!(can_view(Role::Youth, 1, 1, Some(2)));
        assert!(!can_view(Role::Youth, 4, 1, Some(2)));
        // Being the assigned officer's id as a youth is meaningless.
        assert!(!can_view(Role::Youth, 2, 1, Some(2)));
    }
}
