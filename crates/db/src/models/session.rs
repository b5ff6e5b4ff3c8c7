//! Session row model.

use sqlx::FromRow;
use tokenward_core::session::Session;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: String,
    pub refresh_secret_hash: String,
    pub ip_address: String,
    pub is_revoked: bool,
    pub expires_at: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            refresh_secret_hash: row.refresh_secret_hash,
            bound_address: row.ip_address,
            revoked: row.is_revoked,
            expires_at: row.expires_at,
        }
    }
}
