//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Guarded ticket operations run
//! in scoped transactions and return [`OpError`](crate::OpError) so guard
//! violations abort with no partial write.

pub mod audit_repo;
pub mod message_repo;
pub mod note_repo;
pub mod notification_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use audit_repo::AuditRepo;
pub use message_repo::MessageRepo;
pub use note_repo::NoteRepo;
pub use notification_repo::NotificationRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
