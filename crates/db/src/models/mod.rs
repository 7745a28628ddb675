//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - View structs carrying the computed display fields the API returns

pub mod audit;
pub mod notification;
pub mod ticket;
pub mod ticket_message;
pub mod ticket_note;
pub mod user;

pub use audit::AuditEntry;
pub use notification::Notification;
pub use ticket::{BreachedTicket, CreateTicket, ReminderTicket, Ticket, TicketStats, TicketWithNames};
pub use ticket_message::{CreateMessage, MessageWithSender, TicketMessage};
pub use ticket_note::{CreateNote, NoteWithAuthor, TicketNote};
pub use user::{CreateUser, User};
