//! Refresh secret generation.
//!
//! Refresh secrets are opaque random strings handed to the client exactly
//! once. Only a slow salted hash of the secret is ever persisted.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::types::UnixSeconds;

/// Length of a generated refresh secret (alphanumeric characters).
///
/// 48 characters from a 62-symbol alphabet gives roughly 285 bits of entropy.
pub const SECRET_LENGTH: usize = 48;

/// Default refresh secret lifetime in hours.
pub const DEFAULT_REFRESH_LIFETIME_HOURS: i64 = 24;

/// A freshly generated refresh secret and the moment it stops being usable.
#[derive(Debug, Clone)]
pub struct GeneratedSecret {
    /// The plaintext secret (returned to the caller, never stored).
    pub plaintext: String,
    /// Expiry as Unix seconds.
    pub expires_at: UnixSeconds,
}

/// Generate a new refresh secret that expires `lifetime` from now.
pub fn generate_refresh_secret(lifetime: Duration) -> GeneratedSecret {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    GeneratedSecret {
        plaintext,
        expires_at: (Utc::now() + lifetime).timestamp(),
    }
}
