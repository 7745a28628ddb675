//! SLA sweep scheduler.
//!
//! [`SlaScheduler`] runs as a background task and periodically executes
//! two independent queries against the ticket store:
//!
//! 1. The **breach sweep** forces every unresolved ticket whose deadline
//!    has passed to escalation level 2 (tickets already at 2 or 3 are
//!    left alone) and publishes a `ticket.sla_breached` event per raised
//!    row.
//! 2. The **reminder sweep** finds unresolved tickets whose deadline is
//!    inside the lookahead window, stamps `last_reminded_at` so a re-run
//!    never re-sends, and publishes a `ticket.sla_reminder` event per
//!    row, carrying the youth's contact details for off-band delivery.
//!
//! The escalation writes commit before the events are published, so
//! subscribers only ever see committed state.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use civicdesk_core::sla::REMINDER_LOOKAHEAD_HOURS;
use civicdesk_db::repositories::TicketRepo;
use civicdesk_db::DbPool;

use crate::bus::{EventBus, TicketEvent, TICKET_SLA_BREACHED, TICKET_SLA_REMINDER};

/// Default seconds between sweep runs.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// SlaConfig
// ---------------------------------------------------------------------------

/// Configuration for the SLA scheduler.
#[derive(Debug, Clone)]
pub struct SlaConfig {
    /// Seconds between sweep runs.
    pub sweep_interval_secs: u64,
    /// Reminder lookahead window in hours.
    pub reminder_lookahead_hours: i32,
}

impl SlaConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `SLA_SWEEP_INTERVAL_SECS`  | `300`   |
    /// | `SLA_REMINDER_HOURS`       | `24`    |
    pub fn from_env() -> Self {
        let sweep_interval_secs = std::env::var("SLA_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        let reminder_lookahead_hours = std::env::var("SLA_REMINDER_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(REMINDER_LOOKAHEAD_HOURS as i32);
        Self {
            sweep_interval_secs,
            reminder_lookahead_hours,
        }
    }
}

// ---------------------------------------------------------------------------
// SlaScheduler
// ---------------------------------------------------------------------------

/// Background service that runs the SLA breach and reminder sweeps.
pub struct SlaScheduler {
    pool: DbPool,
    bus: Arc<EventBus>,
    config: SlaConfig,
}

impl SlaScheduler {
    /// Create a new scheduler.
    pub fn new(pool: DbPool, bus: Arc<EventBus>, config: SlaConfig) -> Self {
        Self { pool, bus, config }
    }

    /// Run the sweep loop until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.sweep_interval_secs));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("SLA scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep_breaches().await {
                        tracing::error!(error = %e, "SLA breach sweep failed");
                    }
                    if let Err(e) = self.sweep_reminders().await {
                        tracing::error!(error = %e, "SLA reminder sweep failed");
                    }
                }
            }
        }
    }

    /// Escalate breached tickets and publish one event per raised row.
    async fn sweep_breaches(&self) -> Result<(), sqlx::Error> {
        let breached = TicketRepo::sweep_breaches(&self.pool).await?;

        for ticket in &breached {
            self.bus.publish(
                TicketEvent::new(TICKET_SLA_BREACHED, ticket.id).with_payload(
                    serde_json::json!({
                        "title": ticket.title,
                        "youth_id": ticket.youth_id,
                        "officer_id": ticket.officer_id,
                        "escalation_level": ticket.escalation_level,
                    }),
                ),
            );
        }

        if !breached.is_empty() {
            tracing::info!(count = breached.len(), "Escalated SLA-breached tickets");
        }
        Ok(())
    }

    /// Publish a one-shot reminder event per ticket entering the window.
    async fn sweep_reminders(&self) -> Result<(), sqlx::Error> {
        let due =
            TicketRepo::sweep_reminders(&self.pool, self.config.reminder_lookahead_hours).await?;

        for ticket in &due {
            self.bus.publish(
                TicketEvent::new(TICKET_SLA_REMINDER, ticket.id).with_payload(
                    serde_json::json!({
                        "title": ticket.title,
                        "youth_id": ticket.youth_id,
                        "sla_deadline": ticket.sla_deadline,
                        "phone": ticket.phone,
                        "email": ticket.email,
                    }),
                ),
            );
        }

        if !due.is_empty() {
            tracing::info!(count = due.len(), "Queued SLA deadline reminders");
        }
        Ok(())
    }
}
