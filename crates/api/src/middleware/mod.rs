//! Request extractors shared by handlers.
//!
//! - [`client_addr::ClientAddr`] -- The caller's IP address, without port.

pub mod client_addr;
