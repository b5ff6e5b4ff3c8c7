//! Credential primitives and the token rotation protocol.
//!
//! - [`jwt`] -- Access token signing and verification.
//! - [`secret_hash`] -- Argon2id hashing of refresh secrets.
//! - [`service`] -- Issue and refresh operations over a session store.

pub mod jwt;
pub mod secret_hash;
pub mod service;
