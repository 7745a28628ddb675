pub mod notification;
pub mod officer;
pub mod ticket;
