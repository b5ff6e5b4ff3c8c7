//! Domain types shared by the tokenward crates.
//!
//! This crate has no I/O of its own: it defines the session model, the
//! [`session::SessionStore`] and [`notify::Notifier`] traits, refresh secret
//! generation, and the protocol error taxonomy.

pub mod error;
pub mod memory_store;
pub mod notify;
pub mod refresh;
pub mod session;
pub mod types;
