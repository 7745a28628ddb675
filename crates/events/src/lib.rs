//! Civicdesk event bus and notification infrastructure.
//!
//! This crate provides the deferred-work layer between the ticket engine
//! and everything that reacts to it:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Handlers publish a [`TicketEvent`] only
//!   after the owning database transaction commits.
//! - [`Dispatcher`] -- persists notifications and hands messages to the
//!   external delivery channels, which are always best-effort.
//! - [`delivery`] -- email (SMTP), SMS, and WhatsApp gateways.
//! - [`SlaScheduler`] -- periodic breach and reminder sweeps.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod sla;

pub use bus::{EventBus, TicketEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::sms::{SmsConfig, SmsDelivery};
pub use delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};
pub use dispatcher::{Dispatcher, ExternalChannel};
pub use sla::{SlaConfig, SlaScheduler};
