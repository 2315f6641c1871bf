pub mod certification;
pub mod notification;
