use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Session expiry is stored as whole seconds since the Unix epoch.
pub type UnixSeconds = i64;

/// An access credential and the refresh secret minted alongside it.
///
/// This is the wire shape of both the issue and refresh responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
