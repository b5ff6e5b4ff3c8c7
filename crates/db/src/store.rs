//! [`SessionStore`] backed by PostgreSQL.

use async_trait::async_trait;
use tokenward_core::session::{Session, SessionStore, StoreError, StoreResult};

use crate::repositories::SessionRepo;
use crate::{health_check, DbPool};

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Durable session store. Cheap to clone; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn persistence(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Session store query failed");
    StoreError::Persistence(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn save(&self, session: &Session) -> StoreResult<()> {
        SessionRepo::create(&self.pool, session)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
                {
                    StoreError::Duplicate(session.id.clone())
                }
                _ => persistence(err),
            })
    }

    async fn get(&self, id: &str) -> StoreResult<Session> {
        SessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(persistence)?
            .map(Session::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn revoke(&self, id: &str) -> StoreResult<bool> {
        SessionRepo::revoke(&self.pool, id).await.map_err(persistence)
    }

    async fn health_check(&self) -> StoreResult<()> {
        health_check(&self.pool).await.map_err(persistence)
    }
}
