//! External delivery channels for address-change notices.

pub mod email;
pub mod log;
