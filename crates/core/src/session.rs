//! Session model and the storage trait the token protocol is written against.
//!
//! A session binds the hash of one refresh secret to the access credential
//! minted with it (`id` equals the credential's `jti`), the address the pair
//! was issued to, and its revocation/expiry state.
//!
//! ```text
//! ┌──────────┐  revoke   ┌──────────┐
//! │  Active  │──────────►│ Revoked  │  (terminal, stored)
//! └────┬─────┘           └──────────┘
//!      │ now >= expires_at
//!      ▼
//! ┌──────────┐
//! │ Expired  │  (terminal, derived from the clock)
//! └──────────┘
//! ```

use async_trait::async_trait;

use crate::types::UnixSeconds;

/// A persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique session id; equal to the access credential's `jti`.
    pub id: String,
    /// Argon2id PHC string of the refresh secret. Never the plaintext.
    pub refresh_secret_hash: String,
    /// Client address recorded when the pair was issued.
    pub bound_address: String,
    /// Monotonic: once `true`, never `false` again.
    pub revoked: bool,
    /// Expiry as Unix seconds.
    pub expires_at: UnixSeconds,
}

impl Session {
    /// Whether the session is past its expiry at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: UnixSeconds) -> bool {
        now >= self.expires_at
    }

    /// Whether the session can still be exchanged for a new pair at `now`.
    pub fn is_active_at(&self, now: UnixSeconds) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}

/// Errors returned by [`SessionStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error("Session {0} already exists")]
    Duplicate(String),

    #[error("Storage failure: {0}")]
    Persistence(String),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for sessions.
///
/// The token protocol only ever holds an `Arc<dyn SessionStore>` and never
/// branches on which backend is behind it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session keyed by its id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Duplicate`] if a session with the same id exists
    /// - [`StoreError::Persistence`] on storage failure
    async fn save(&self, session: &Session) -> StoreResult<()>;

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no such session exists
    /// - [`StoreError::Persistence`] on storage failure
    async fn get(&self, id: &str) -> StoreResult<Session>;

    /// Mark a session revoked.
    ///
    /// The update is atomic and conditional on the session not already being
    /// revoked. Returns `true` only for the call that performed the
    /// transition, so of several concurrent callers exactly one observes
    /// `true`. Revoking an already-revoked or unknown session is a no-op
    /// success returning `false`.
    async fn revoke(&self, id: &str) -> StoreResult<bool>;

    /// Check the backend. Stores without a remote dependency are always healthy.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
