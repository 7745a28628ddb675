//! Integration tests for the SLA breach and reminder sweeps.
//!
//! The sweeps are driven directly against the repository, with deadlines
//! rewound by SQL to simulate the passage of time.

mod common;

use common::{create_user, create_user_with_phone};
use civicdesk_core::roles::Role;
use civicdesk_core::types::DbId;
use civicdesk_db::models::ticket::CreateTicket;
use civicdesk_db::repositories::TicketRepo;
use sqlx::PgPool;

async fn seed_ticket(pool: &PgPool, youth_id: DbId, title: &str) -> DbId {
    let input = CreateTicket {
        title: title.to_string(),
        description: "seeded".to_string(),
        category: "general".to_string(),
    };
    TicketRepo::create_assigned(pool, youth_id, &input)
        .await
        .expect("ticket creation should succeed")
        .id
}

/// Move a ticket's deadline relative to now by the given number of hours.
async fn shift_deadline(pool: &PgPool, ticket_id: DbId, hours: i32) {
    sqlx::query("UPDATE tickets SET sla_deadline = NOW() + make_interval(hours => $2) WHERE id = $1")
        .bind(ticket_id)
        .bind(hours)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Breach sweep
// ---------------------------------------------------------------------------

/// A ticket past its deadline is forced to level 2; the sweep reports it
/// exactly once.
#[sqlx::test(migrations = "../db/migrations")]
async fn breach_sweep_escalates_once(pool: PgPool) {
    let youth = create_user(&pool, "wanjiku", Role::Youth).await;
    let ticket_id = seed_ticket(&pool, youth.id, "overdue").await;
    shift_deadline(&pool, ticket_id, -1).await;

    let breached = TicketRepo::sweep_breaches(&pool).await.unwrap();
    assert_eq!(breached.len(), 1);
    assert_eq!(breached[0].id, ticket_id);
    assert_eq!(breached[0].escalation_level.get(), 2);

    // Re-running reports nothing: the level filter makes the sweep
    // idempotent.
    let again = TicketRepo::sweep_breaches(&pool).await.unwrap();
    assert!(again.is_empty());
}

/// Resolved tickets and tickets still inside their window are untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn breach_sweep_skips_resolved_and_current(pool: PgPool) {
    let youth = create_user(&pool, "wanjiku", Role::Youth).await;

    let resolved_id = seed_ticket(&pool, youth.id, "done late").await;
    shift_deadline(&pool, resolved_id, -1).await;
    sqlx::query("UPDATE tickets SET status = 'resolved' WHERE id = $1")
        .bind(resolved_id)
        .execute(&pool)
        .await
        .unwrap();

    let _current_id = seed_ticket(&pool, youth.id, "on time").await;

    let breached = TicketRepo::sweep_breaches(&pool).await.unwrap();
    assert!(breached.is_empty());
}

/// A ticket already escalated to level 3 is not lowered by a breach.
#[sqlx::test(migrations = "../db/migrations")]
async fn breach_sweep_never_lowers_level(pool: PgPool) {
    let youth = create_user(&pool, "wanjiku", Role::Youth).await;
    let ticket_id = seed_ticket(&pool, youth.id, "already maximal").await;
    shift_deadline(&pool, ticket_id, -1).await;
    sqlx::query("UPDATE tickets SET escalation_level = 3 WHERE id = $1")
        .bind(ticket_id)
        .execute(&pool)
        .await
        .unwrap();

    let breached = TicketRepo::sweep_breaches(&pool).await.unwrap();
    assert!(breached.is_empty());

    let ticket = TicketRepo::find_by_id(&pool, ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.escalation_level.get(), 3);
}

/// Unassigned tickets breach like any other.
#[sqlx::test(migrations = "../db/migrations")]
async fn breach_sweep_includes_unassigned(pool: PgPool) {
    let youth = create_user(&pool, "wanjiku", Role::Youth).await;
    // No officers exist, so the ticket is unassigned.
    let ticket_id = seed_ticket(&pool, youth.id, "orphan overdue").await;
    shift_deadline(&pool, ticket_id, -1).await;

    let breached = TicketRepo::sweep_breaches(&pool).await.unwrap();
    assert_eq!(breached.len(), 1);
    assert_eq!(breached[0].officer_id, None);
}

// ---------------------------------------------------------------------------
// Reminder sweep
// ---------------------------------------------------------------------------

/// A ticket inside the lookahead window is picked up with the youth's
/// contact details, and only once.
#[sqlx::test(migrations = "../db/migrations")]
async fn reminder_sweep_fires_once(pool: PgPool) {
    let youth = create_user_with_phone(&pool, "wanjiku", Role::Youth).await;
    let ticket_id = seed_ticket(&pool, youth.id, "due soon").await;
    shift_deadline(&pool, ticket_id, 12).await;

    let reminders = TicketRepo::sweep_reminders(&pool, 24).await.unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].id, ticket_id);
    assert_eq!(reminders[0].phone.as_deref(), Some("+254700000001"));
    assert_eq!(reminders[0].email, "wanjiku@test.com");

    // The stamp in the same statement makes a re-run a no-op.
    let again = TicketRepo::sweep_reminders(&pool, 24).await.unwrap();
    assert!(again.is_empty());
}

/// Tickets outside the window, already past deadline, or resolved are not
/// reminded.
#[sqlx::test(migrations = "../db/migrations")]
async fn reminder_sweep_respects_window(pool: PgPool) {
    let youth = create_user(&pool, "wanjiku", Role::Youth).await;

    let far_id = seed_ticket(&pool, youth.id, "far away").await;
    shift_deadline(&pool, far_id, 48).await;

    let past_id = seed_ticket(&pool, youth.id, "already late").await;
    shift_deadline(&pool, past_id, -1).await;

    let resolved_id = seed_ticket(&pool, youth.id, "wrapped up").await;
    shift_deadline(&pool, resolved_id, 12).await;
    sqlx::query("UPDATE tickets SET status = 'resolved' WHERE id = $1")
        .bind(resolved_id)
        .execute(&pool)
        .await
        .unwrap();

    let reminders = TicketRepo::sweep_reminders(&pool, 24).await.unwrap();
    assert!(reminders.is_empty());
}
