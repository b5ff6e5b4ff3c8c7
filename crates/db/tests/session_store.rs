//! Integration tests for the PostgreSQL session store.
//!
//! These need a live database (`DATABASE_URL`); run them with
//! `cargo test -p tokenward-db -- --ignored`.

use assert_matches::assert_matches;
use sqlx::PgPool;
use tokenward_core::session::{Session, SessionStore, StoreError};
use tokenward_db::repositories::SessionRepo;
use tokenward_db::PgSessionStore;

fn test_session(id: &str) -> Session {
    Session {
        id: id.to_string(),
        refresh_secret_hash: "test_hash".to_string(),
        bound_address: "172.0.0.1".to_string(),
        revoked: false,
        expires_at: 1_764_743_068,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn save_then_get_round_trips_all_columns(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.save(&test_session("1")).await.unwrap();

    let session = store.get("1").await.unwrap();
    assert_eq!(session, test_session("1"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn get_unknown_session_is_not_found(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    assert_matches!(store.get("missing").await, Err(StoreError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn duplicate_id_is_rejected(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.save(&test_session("1")).await.unwrap();

    assert_matches!(
        store.save(&test_session("1")).await,
        Err(StoreError::Duplicate(id)) if id == "1"
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn revoke_transitions_once(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.save(&test_session("1")).await.unwrap();

    assert!(store.revoke("1").await.unwrap());
    assert!(!store.revoke("1").await.unwrap(), "second revoke is a no-op");
    assert!(store.get("1").await.unwrap().revoked);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn concurrent_revokes_have_one_winner(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.save(&test_session("1")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.revoke("1").await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn delete_expired_keeps_live_sessions(pool: PgPool) {
    let store = PgSessionStore::new(pool.clone());
    let mut expired = test_session("old");
    expired.expires_at = 100;
    let mut live = test_session("new");
    live.expires_at = 10_000;
    store.save(&expired).await.unwrap();
    store.save(&live).await.unwrap();

    let deleted = SessionRepo::delete_expired(&pool, 5_000).await.unwrap();
    assert_eq!(deleted, 1);
    assert_matches!(store.get("old").await, Err(StoreError::NotFound(_)));
    assert!(store.get("new").await.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn health_check_passes(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    assert!(store.health_check().await.is_ok());
}
