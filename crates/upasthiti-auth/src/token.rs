//! HS256 account access tokens and the signing primitives shared with
//! QR tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Distinguishes the two token families signed with the same secret.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Qr,
}

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// Duplicate of `sub`, kept for clients that read `id`.
    pub id: String,
    pub kind: TokenKind,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

pub(crate) fn encoding_key(config: &AuthConfig) -> Result<EncodingKey, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is empty".into()));
    }
    Ok(EncodingKey::from_secret(config.jwt_secret.as_bytes()))
}

pub(crate) fn decoding_key(config: &AuthConfig) -> Result<DecodingKey, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is empty".into()));
    }
    Ok(DecodingKey::from_secret(config.jwt_secret.as_bytes()))
}

/// HS256-only validation pinned to the configured issuer.
///
/// Expiry is checked by the caller against an explicit `now` so that
/// it is exact (no leeway) and testable.
pub(crate) fn validation(issuer: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iss"]);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation
}

pub(crate) fn encode<T: Serialize>(claims: &T, key: &EncodingKey) -> Result<String, AuthError> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

pub(crate) fn decode<T: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<T, AuthError> {
    if token.trim().is_empty() {
        return Err(AuthError::TokenInvalid("empty token".into()));
    }
    jsonwebtoken::decode::<T>(token.trim(), key, validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// `now + ttl_secs`, rejected when it leaves the representable
/// timestamp range.
pub(crate) fn expiry(now: i64, ttl_secs: u64) -> Result<i64, AuthError> {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
        .ok_or_else(|| AuthError::InvalidInput(format!("token lifetime too large: {ttl_secs}s")))
}

/// Issue a signed HS256 access token for `user_id`.
pub fn issue_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    issue_access_token_at(user_id, config, Utc::now().timestamp())
}

pub fn issue_access_token_at(
    user_id: Uuid,
    config: &AuthConfig,
    now: i64,
) -> Result<String, AuthError> {
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        id: user_id.to_string(),
        kind: TokenKind::Access,
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: expiry(now, config.access_token_lifetime_secs)?,
        jti: Uuid::new_v4().to_string(),
    };

    encode(&claims, &encoding_key(config)?)
}

/// Decode and verify an HS256 access token.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    decode_access_token_at(token, config, Utc::now().timestamp())
}

pub fn decode_access_token_at(
    token: &str,
    config: &AuthConfig,
    now: i64,
) -> Result<AccessTokenClaims, AuthError> {
    let claims: AccessTokenClaims = decode(
        token,
        &decoding_key(config)?,
        &validation(&config.jwt_issuer),
    )?;

    if claims.kind != TokenKind::Access {
        return Err(AuthError::TokenInvalid("not an access token".into()));
    }
    if now > claims.exp {
        return Err(AuthError::TokenExpired);
    }
    Ok(claims)
}

/// Access token subject parsed as a user ID.
pub fn subject_user_id(claims: &AccessTokenClaims) -> Result<Uuid, AuthError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|e| AuthError::TokenInvalid(format!("subject is not a UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-0123456789".into(),
            jwt_issuer: "upasthiti-test".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.id, user_id.to_string());
        assert_eq!(claims.iss, "upasthiti-test");
        assert_eq!(claims.exp - claims.iat, 7200);
        assert_eq!(subject_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let uid = Uuid::new_v4();

        let c1 = decode_access_token(&issue_access_token(uid, &config).unwrap(), &config).unwrap();
        let c2 = decode_access_token(&issue_access_token(uid, &config).unwrap(), &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let token = issue_access_token_at(Uuid::new_v4(), &config, now - 7201).unwrap();

        assert!(matches!(
            decode_access_token_at(&token, &config, now),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_access_token(Uuid::new_v4(), &config).unwrap();

        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..test_config()
        };
        assert!(matches!(
            decode_access_token(&token, &other),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = test_config();
        let token = issue_access_token(Uuid::new_v4(), &config).unwrap();

        let other = AuthConfig {
            jwt_issuer: "someone-else".into(),
            ..test_config()
        };
        assert!(decode_access_token(&token, &other).is_err());
    }

    #[test]
    fn empty_secret_is_a_crypto_error() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            ..test_config()
        };
        assert!(matches!(
            issue_access_token(Uuid::new_v4(), &config),
            Err(AuthError::Crypto(_))
        ));
    }

    #[test]
    fn oversized_lifetime_is_rejected() {
        let config = AuthConfig {
            access_token_lifetime_secs: u64::MAX,
            ..test_config()
        };
        assert!(matches!(
            issue_access_token_at(Uuid::new_v4(), &config, 1_700_000_000),
            Err(AuthError::InvalidInput(_))
        ));

        assert!(matches!(expiry(i64::MAX - 10, 60), Err(AuthError::InvalidInput(_))));
        assert_eq!(expiry(1_700_000_000, 900).unwrap(), 1_700_000_900);
    }

    #[test]
    fn blank_token_is_invalid() {
        assert!(matches!(
            decode_access_token("   ", &test_config()),
            Err(AuthError::TokenInvalid(_))
        ));
    }
}
