//! Repository for the `tickets` table.
//!
//! Every mutating operation is a scoped transaction: read the current row
//! (locked where concurrent writers must serialize), validate the guard,
//! write the new row plus any message row, commit. A guard violation
//! aborts the transaction, so no side effect is observable to other
//! actors before a successful commit.

use sqlx::PgPool;

use civicdesk_core::assignment::{self, OfficerCandidate};
use civicdesk_core::error::CoreError;
use civicdesk_core::roles::Role;
use civicdesk_core::sla::SLA_DEADLINE_HOURS;
use civicdesk_core::ticket::{self, TicketStatus};
use civicdesk_core::types::{DbId, Timestamp};

use crate::models::ticket::{
    BreachedTicket, CreateTicket, ReminderTicket, Ticket, TicketStats, TicketWithNames,
};
use crate::models::ticket_message::{MessageWithSender, TicketMessage};
use crate::OpError;

/// Unqualified column list for `tickets` queries.
const COLUMNS: &str = "id, youth_id, officer_id, title, description, category, status, \
                       escalation_level, sla_deadline, last_reminded_at, created_at, updated_at";

/// `t.`-qualified column list for joined queries.
const T_COLUMNS: &str = "t.id, t.youth_id, t.officer_id, t.title, t.description, t.category, \
                         t.status, t.escalation_level, t.sla_deadline, t.last_reminded_at, \
                         t.created_at, t.updated_at";

/// One row of the assignment candidate query.
#[derive(sqlx::FromRow)]
struct CandidateRow {
    user_id: DbId,
    active_tickets: i64,
    created_at: Timestamp,
}

/// Provides the ticket lifecycle operations.
pub struct TicketRepo;

impl TicketRepo {
    /// Create a ticket, running the assignment policy atomically with the
    /// insert.
    ///
    /// The candidate workloads are read inside the same transaction as the
    /// insert; a concurrent creation may leave the counts one ticket
    /// stale, which skews the choice by at most one assignment and never
    /// faults. No active officer means the ticket is created unassigned.
    pub async fn create_assigned(
        pool: &PgPool,
        youth_id: DbId,
        input: &CreateTicket,
    ) -> Result<Ticket, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let rows: Vec<CandidateRow> = sqlx::query_as(
            "SELECT u.id AS user_id, \
                    COUNT(t.id) FILTER (WHERE t.status IN ('open', 'in_progress')) AS active_tickets, \
                    u.created_at \
             FROM users u \
             LEFT JOIN tickets t ON t.officer_id = u.id \
             WHERE u.role = 'officer' AND u.is_active = true \
             GROUP BY u.id, u.created_at",
        )
        .fetch_all(&mut *tx)
        .await?;

        let candidates: Vec<OfficerCandidate> = rows
            .into_iter()
            .map(|r| OfficerCandidate {
                user_id: r.user_id,
                active_tickets: r.active_tickets,
                created_at: r.created_at,
            })
            .collect();
        let officer_id = assignment::select_officer(&candidates);

        let insert_query = format!(
            "INSERT INTO tickets \
                 (youth_id, officer_id, title, description, category, sla_deadline) \
             VALUES ($1, $2, $3, $4, $5, NOW() + make_interval(hours => $6)) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Ticket>(&insert_query)
            .bind(youth_id)
            .bind(officer_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(SLA_DEADLINE_HOURS as i32)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a ticket by ID with display names.
    pub async fn find_with_names(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TicketWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS}, y.username AS youth_name, o.username AS officer_name \
             FROM tickets t \
             JOIN users y ON y.id = t.youth_id \
             LEFT JOIN users o ON o.id = t.officer_id \
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, TicketWithNames>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets visible to the given actor, newest first.
    ///
    /// The visibility policy is applied in the query itself: admins see
    /// everything, officers their assignments, youths their own tickets.
    pub async fn list_for(
        pool: &PgPool,
        role: Role,
        actor_id: DbId,
    ) -> Result<Vec<TicketWithNames>, sqlx::Error> {
        let filter = match role {
            Role::Admin | Role::SuperAdmin => "",
            Role::Officer => "WHERE t.officer_id = $1",
            Role::Youth => "WHERE t.youth_id = $1",
        };
        let query = format!(
            "SELECT {T_COLUMNS}, y.username AS youth_name, o.username AS officer_name \
             FROM tickets t \
             JOIN users y ON y.id = t.youth_id \
             LEFT JOIN users o ON o.id = t.officer_id \
             {filter} \
             ORDER BY t.created_at DESC"
        );
        let mut q = sqlx::query_as::<_, TicketWithNames>(&query);
        if !filter.is_empty() {
            q = q.bind(actor_id);
        }
        q.fetch_all(pool).await
    }

    /// List tickets with no assigned officer (admin surface).
    pub async fn list_unassigned(pool: &PgPool) -> Result<Vec<TicketWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS}, y.username AS youth_name, NULL AS officer_name \
             FROM tickets t \
             JOIN users y ON y.id = t.youth_id \
             WHERE t.officer_id IS NULL \
             ORDER BY t.created_at DESC"
        );
        sqlx::query_as::<_, TicketWithNames>(&query)
            .fetch_all(pool)
            .await
    }

    /// Escalate a ticket on behalf of `actor_id`.
    ///
    /// Serializes concurrent escalations of the same ticket with a row
    /// lock so level increments never lose updates. The system message
    /// recording the new level is appended in the same transaction. The
    /// level caps at 3; escalating a level-3 ticket is still a permitted
    /// operation and still produces the message and status change.
    pub async fn escalate(
        pool: &PgPool,
        ticket_id: DbId,
        actor_id: DbId,
        role: Role,
    ) -> Result<(Ticket, MessageWithSender), OpError> {
        let mut tx = pool.begin().await?;

        let select_query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Ticket>(&select_query)
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Ticket",
                id: ticket_id,
            })?;

        ticket::can_escalate(role, actor_id, current.officer_id)?;

        let new_level = current.escalation_level.bump();
        let update_query = format!(
            "UPDATE tickets \
             SET escalation_level = $2, status = 'in_progress', updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ticket>(&update_query)
            .bind(ticket_id)
            .bind(new_level)
            .fetch_one(&mut *tx)
            .await?;

        let notice = ticket::escalation_notice(new_level);
        let message = sqlx::query_as::<_, TicketMessage>(
            "INSERT INTO ticket_messages (ticket_id, sender_id, message) \
             VALUES ($1, $2, $3) \
             RETURNING id, ticket_id, sender_id, message, created_at",
        )
        .bind(ticket_id)
        .bind(actor_id)
        .bind(&notice)
        .fetch_one(&mut *tx)
        .await?;

        let sender_name: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((updated, MessageWithSender {
            message,
            sender_name,
        }))
    }

    /// Reassign a ticket to `officer_id` (already resolved and validated
    /// by the caller). Forces status to in_progress; escalation level is
    /// untouched.
    pub async fn reassign(
        pool: &PgPool,
        ticket_id: DbId,
        officer_id: DbId,
    ) -> Result<Ticket, OpError> {
        let query = format!(
            "UPDATE tickets \
             SET officer_id = $2, status = 'in_progress', updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(officer_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                OpError::Core(CoreError::NotFound {
                    entity: "Ticket",
                    id: ticket_id,
                })
            })
    }

    /// Update a ticket's status on behalf of `actor_id`.
    pub async fn update_status(
        pool: &PgPool,
        ticket_id: DbId,
        actor_id: DbId,
        role: Role,
        new_status: TicketStatus,
    ) -> Result<Ticket, OpError> {
        let mut tx = pool.begin().await?;

        let select_query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Ticket>(&select_query)
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Ticket",
                id: ticket_id,
            })?;

        ticket::can_update_status(role, actor_id, current.officer_id)?;

        let update_query = format!(
            "UPDATE tickets SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ticket>(&update_query)
            .bind(ticket_id)
            .bind(new_status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Aggregate status counts for the admin dashboard.
    pub async fn stats(pool: &PgPool) -> Result<TicketStats, sqlx::Error> {
        sqlx::query_as::<_, TicketStats>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'open') AS open, \
                    COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress, \
                    COUNT(*) FILTER (WHERE status = 'resolved') AS resolved \
             FROM tickets",
        )
        .fetch_one(pool)
        .await
    }

    /// SLA breach sweep: force every unresolved ticket whose deadline has
    /// passed to at least level 2.
    ///
    /// Only rows actually raised are returned, so a breach notifies once;
    /// tickets already at level 2 or 3 are left untouched.
    pub async fn sweep_breaches(pool: &PgPool) -> Result<Vec<BreachedTicket>, sqlx::Error> {
        sqlx::query_as::<_, BreachedTicket>(
            "UPDATE tickets \
             SET escalation_level = 2, updated_at = NOW() \
             WHERE status IN ('open', 'in_progress') \
               AND sla_deadline <= NOW() \
               AND escalation_level < 2 \
             RETURNING id, youth_id, officer_id, title, escalation_level",
        )
        .fetch_all(pool)
        .await
    }

    /// SLA reminder sweep: pick up unresolved tickets whose deadline falls
    /// within the lookahead window and stamp `last_reminded_at` in the
    /// same statement, so a re-run never re-sends.
    pub async fn sweep_reminders(
        pool: &PgPool,
        lookahead_hours: i32,
    ) -> Result<Vec<ReminderTicket>, sqlx::Error> {
        sqlx::query_as::<_, ReminderTicket>(
            "UPDATE tickets t \
             SET last_reminded_at = NOW() \
             FROM users u \
             WHERE u.id = t.youth_id \
               AND t.status IN ('open', 'in_progress') \
               AND t.sla_deadline > NOW() \
               AND t.sla_deadline <= NOW() + make_interval(hours => $1) \
               AND t.last_reminded_at IS NULL \
             RETURNING t.id, t.youth_id, t.title, t.sla_deadline, u.phone, u.email",
        )
        .bind(lookahead_hours)
        .fetch_all(pool)
        .await
    }
}
