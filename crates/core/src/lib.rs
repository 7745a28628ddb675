//! Civicdesk domain logic.
//!
//! Pure types and functions shared by the persistence, event, and API
//! crates. Nothing in here performs I/O; every decision the ticket engine
//! makes (assignment, visibility, state transitions, SLA arithmetic) is a
//! plain function over values so it can be unit-tested in isolation.

pub mod assignment;
pub mod channels;
pub mod error;
pub mod roles;
pub mod sla;
pub mod ticket;
pub mod types;
pub mod visibility;
