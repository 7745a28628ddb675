//! External delivery channels.
//!
//! Everything in here is fire-and-forget from the ticket engine's point of
//! view: a failed send is logged and swallowed by the dispatcher, never
//! retried synchronously, and never able to fail the ticket mutation that
//! triggered it.

pub mod email;
pub mod sms;
pub mod whatsapp;
