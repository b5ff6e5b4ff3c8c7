//! Repository for the `sessions` table.

use sqlx::PgPool;
use tokenward_core::session::Session;

use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, refresh_secret_hash, ip_address, is_revoked, expires_at";

/// Provides queries for refresh sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session.
    pub async fn create(pool: &PgPool, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO sessions (id, refresh_secret_hash, ip_address, is_revoked, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&session.id)
        .bind(&session.refresh_secret_hash)
        .bind(&session.bound_address)
        .bind(session.revoked)
        .bind(session.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a session by id, regardless of its revocation or expiry state.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    ///
    /// The `is_revoked = false` predicate makes this a compare-and-set: of
    /// several concurrent calls for the same id, only one updates the row.
    pub async fn revoke(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = true WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired before `now` (Unix seconds).
    /// Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
