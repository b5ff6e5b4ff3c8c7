//! Access credential signing and verification.
//!
//! Access tokens are HS512-signed JWTs carrying a flat [`Claims`] payload.
//! Verification deliberately tolerates expiry: a refresh request presents the
//! (usually expired) access token only so the server can learn which session
//! it belongs to. Session expiry, not token expiry, governs refresh.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tokenward_core::refresh::DEFAULT_REFRESH_LIFETIME_HOURS;

use crate::config::{check_lifetime, env_or, ConfigError};

/// Algorithm used for newly issued tokens.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// The HMAC family. Anything else (including every asymmetric algorithm) is
/// rejected before the signature is checked, so a token cannot downgrade the
/// verifier into treating the shared secret as a public key.
pub const ACCEPTED_ALGORITHMS: &[Algorithm] =
    &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Unique token identifier; doubles as the session id.
    pub jti: String,
    /// Subject -- the user id the pair was issued for.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Client address the token was issued to.
    pub ip_address: String,
}

/// Errors raised while signing or verifying access tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Unsupported token algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("Invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh secret lifetime in hours (default: 24).
    pub refresh_token_expiry_hours: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// Both lifetimes must be positive and within chrono's range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_expiry_mins = env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?;
        check_lifetime(
            "JWT_ACCESS_EXPIRY_MINS",
            access_token_expiry_mins,
            Duration::try_minutes,
        )?;

        let config = Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_hours: env_or(
                "JWT_REFRESH_EXPIRY_HOURS",
                DEFAULT_REFRESH_LIFETIME_HOURS,
            )?,
        };
        config.refresh_lifetime()?;
        Ok(config)
    }

    /// Refresh secret lifetime as a duration.
    pub fn refresh_lifetime(&self) -> Result<Duration, ConfigError> {
        check_lifetime(
            "JWT_REFRESH_EXPIRY_HOURS",
            self.refresh_token_expiry_hours,
            Duration::try_hours,
        )
    }
}

/// Signs and verifies access tokens with a single shared secret.
#[derive(Clone)]
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
}

impl JwtSigner {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_lifetime: Duration::minutes(config.access_token_expiry_mins),
        }
    }

    /// Sign a new access token for `subject`, identified by `jti` and bound
    /// to `ip_address`. Returns the encoded token with the claims it carries.
    pub fn issue(
        &self,
        jti: &str,
        subject: &str,
        ip_address: &str,
    ) -> Result<(String, Claims), TokenError> {
        let now = Utc::now();
        let claims = Claims {
            jti: jti.to_string(),
            sub: subject.to_string(),
            exp: (now + self.access_lifetime).timestamp(),
            iat: now.timestamp(),
            ip_address: ip_address.to_string(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;
        Ok((token, claims))
    }

    /// Check the signature and structure of `token` and return its claims.
    ///
    /// An expired token is accepted. A token declaring any algorithm outside
    /// [`ACCEPTED_ALGORITHMS`], carrying a bad signature, or missing required
    /// claims is rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(TokenError::Invalid)?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(TokenError::Invalid)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Header segment of `{"alg":"RS256","typ":"JWT"}`.
    const RS256_HEADER: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
    /// Header segment of `{"alg":"none","typ":"JWT"}`.
    const NONE_HEADER: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_hours: 24,
        }
    }

    fn signer() -> JwtSigner {
        JwtSigner::new(&test_config())
    }

    fn replace_header(token: &str, header: &str) -> String {
        let (_, rest) = token.split_once('.').expect("token has three segments");
        format!("{header}.{rest}")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let (token, issued) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        let claims = signer().verify(&token).unwrap();

        assert_eq!(claims, issued);
        assert_eq!(claims.jti, "jti-1");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.ip_address, "1.2.3.4");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_issued_tokens_use_hs512() {
        let (token, _) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        assert_eq!(decode_header(&token).unwrap().alg, Algorithm::HS512);
    }

    #[test]
    fn test_expired_token_is_accepted() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            jti: "old".to_string(),
            sub: "u1".to_string(),
            exp: now - 3600,
            iat: now - 4500,
            ip_address: "1.2.3.4".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let verified = signer().verify(&token).expect("expiry alone must not fail");
        assert_eq!(verified.jti, "old");
    }

    #[test]
    fn test_other_hmac_variant_is_accepted() {
        let config = test_config();
        let (_, claims) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(signer().verify(&token).is_ok());
    }

    #[test]
    fn test_different_secret_fails() {
        let other = JwtSigner::new(&JwtConfig {
            secret: "secret-bravo".to_string(),
            ..test_config()
        });
        let (token, _) = other.issue("jti-1", "u1", "1.2.3.4").unwrap();

        assert_matches!(signer().verify(&token), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn test_asymmetric_algorithm_is_rejected() {
        let (token, _) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        let forged = replace_header(&token, RS256_HEADER);

        assert_matches!(
            signer().verify(&forged),
            Err(TokenError::UnsupportedAlgorithm(Algorithm::RS256))
        );
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let (token, _) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        let forged = replace_header(&token, NONE_HEADER);

        assert!(signer().verify(&forged).is_err());
    }

    #[test]
    fn test_spliced_payload_fails() {
        let (token, _) = signer().issue("jti-1", "u1", "1.2.3.4").unwrap();
        let (other, _) = signer().issue("jti-2", "admin", "1.2.3.4").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_matches!(signer().verify(&spliced), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn test_refresh_lifetime_must_be_positive() {
        let lifetime = test_config().refresh_lifetime().unwrap();
        assert_eq!(lifetime, Duration::hours(24));

        let expired = JwtConfig {
            refresh_token_expiry_hours: 0,
            ..test_config()
        };
        assert_matches!(
            expired.refresh_lifetime(),
            Err(ConfigError::Invalid { var: "JWT_REFRESH_EXPIRY_HOURS", .. })
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_matches!(signer().verify("not-a-jwt"), Err(TokenError::Invalid(_)));
        assert_matches!(signer().verify(""), Err(TokenError::Invalid(_)));
    }
}
