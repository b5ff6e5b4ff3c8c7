//! Token pair issuance and single-use refresh rotation.
//!
//! [`TokenService`] ties together the [`JwtSigner`], refresh secret
//! generation, the [`SecretHasher`] and a [`SessionStore`]. Issuance writes
//! the session as its very last step, so a signing or hashing failure never
//! leaves a partial session behind. Refresh revokes the presented session
//! before minting the replacement pair: the store's conditional revoke is
//! what lets at most one of several concurrent refreshes through.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokenward_core::error::CoreError;
use tokenward_core::notify::AddressChangeNotice;
use tokenward_core::refresh::generate_refresh_secret;
use tokenward_core::session::{Session, SessionStore, StoreError};
use tokenward_core::types::TokenPair;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::auth::jwt::JwtSigner;
use crate::auth::secret_hash::SecretHasher;
use crate::notifications::NotificationDispatcher;

/// Plaintext behind the decoy hash verified against when no session exists.
const DECOY_SECRET: &str = "tokenward-decoy-refresh-secret";

/// Issues and rotates access/refresh token pairs.
pub struct TokenService {
    signer: JwtSigner,
    hasher: SecretHasher,
    store: Arc<dyn SessionStore>,
    notifications: NotificationDispatcher,
    refresh_lifetime: Duration,
    /// Hash of [`DECOY_SECRET`], computed on first use with the configured cost.
    decoy_hash: OnceCell<String>,
}

impl TokenService {
    pub fn new(
        signer: JwtSigner,
        hasher: SecretHasher,
        store: Arc<dyn SessionStore>,
        notifications: NotificationDispatcher,
        refresh_lifetime: Duration,
    ) -> Self {
        Self {
            signer,
            hasher,
            store,
            notifications,
            refresh_lifetime,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Mint a new pair for `user_id`, bound to `source_address`.
    ///
    /// The returned refresh secret is the only copy of the plaintext; the
    /// stored session keeps its Argon2id hash.
    pub async fn issue_pair(
        &self,
        user_id: &str,
        source_address: &str,
    ) -> Result<TokenPair, CoreError> {
        if user_id.is_empty() {
            return Err(CoreError::BadRequest("User id must not be empty".into()));
        }

        let session_id = Uuid::new_v4().to_string();

        let (access_token, claims) = self
            .signer
            .issue(&session_id, user_id, source_address)
            .map_err(|e| CoreError::IssuanceFailed(e.to_string()))?;

        let secret = generate_refresh_secret(self.refresh_lifetime);

        let refresh_secret_hash = self
            .hasher
            .hash_blocking(secret.plaintext.clone())
            .await
            .map_err(|e| CoreError::IssuanceFailed(e.to_string()))?;

        let session = Session {
            id: session_id,
            refresh_secret_hash,
            bound_address: claims.ip_address,
            revoked: false,
            expires_at: secret.expires_at,
        };
        self.store
            .save(&session)
            .await
            .map_err(|e| CoreError::IssuanceFailed(e.to_string()))?;

        tracing::info!(
            session_id = %session.id,
            user_id,
            address = %session.bound_address,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token: secret.plaintext,
        })
    }

    /// Exchange a (possibly expired) access token and its refresh secret for
    /// a new pair bound to `request_address`.
    ///
    /// Every credential or session problem is reported as
    /// [`CoreError::Unauthorized`]; the message is for logs only.
    pub async fn refresh_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
        request_address: &str,
    ) -> Result<TokenPair, CoreError> {
        if access_token.is_empty() || refresh_token.is_empty() {
            return Err(CoreError::BadRequest(
                "Both access_token and refresh_token are required".into(),
            ));
        }

        let claims = self
            .signer
            .verify(access_token)
            .map_err(|e| CoreError::Unauthorized(format!("Access token rejected: {e}")))?;

        let session = match self.store.get(&claims.jti).await {
            Ok(session) => session,
            Err(StoreError::NotFound(id)) => {
                self.verify_against_decoy(refresh_token).await;
                return Err(CoreError::NotFound {
                    entity: "Session",
                    id,
                });
            }
            Err(other) => return Err(CoreError::Internal(other.to_string())),
        };

        let matches = self
            .hasher
            .verify_blocking(
                refresh_token.to_string(),
                session.refresh_secret_hash.clone(),
            )
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        if !matches {
            return Err(CoreError::Unauthorized(format!(
                "Refresh secret does not match session {}",
                session.id
            )));
        }

        if !session.is_active_at(Utc::now().timestamp()) {
            if session.revoked {
                tracing::warn!(
                    session_id = %session.id,
                    user_id = %claims.sub,
                    address = request_address,
                    "Revoked refresh secret presented again, possible token reuse"
                );
                return Err(CoreError::Unauthorized(format!(
                    "Session {} is revoked",
                    session.id
                )));
            }
            return Err(CoreError::Unauthorized(format!(
                "Session {} has expired",
                session.id
            )));
        }

        let revoked_now = self
            .store
            .revoke(&session.id)
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        if !revoked_now {
            tracing::warn!(
                session_id = %session.id,
                user_id = %claims.sub,
                "Concurrent refresh lost the revoke race"
            );
            return Err(CoreError::Unauthorized(format!(
                "Session {} was revoked concurrently",
                session.id
            )));
        }

        if request_address != session.bound_address {
            tracing::info!(
                session_id = %session.id,
                bound_address = %session.bound_address,
                request_address,
                "Refresh from a different address"
            );
            self.notifications.dispatch(AddressChangeNotice {
                subject: claims.sub.clone(),
                session_id: session.id.clone(),
                bound_address: session.bound_address.clone(),
                request_address: request_address.to_string(),
                occurred_at: Utc::now(),
            });
        }

        self.issue_pair(&claims.sub, request_address).await
    }

    /// Run one Argon2 verification against a fixed decoy hash so an unknown
    /// session costs the same as a known one. The outcome is discarded.
    async fn verify_against_decoy(&self, refresh_token: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash_blocking(DECOY_SECRET.to_string()))
            .await;

        match decoy {
            Ok(hash) => {
                let _ = self
                    .hasher
                    .verify_blocking(refresh_token.to_string(), hash.clone())
                    .await;
            }
            Err(e) => tracing::warn!(error = %e, "Decoy hash unavailable"),
        }
    }
}
