//! QR attendance tokens.
//!
//! A QR token is a short-lived HS256 JWT naming one class session and,
//! optionally, the geofence a scan must come from. Nothing is stored
//! server-side: validity is derived from the signature and `exp` alone,
//! so a token can be presented any number of times until it expires.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use upasthiti_core::geo::Geofence;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{self, TokenKind};

/// Default QR token lifetime in seconds.
pub const DEFAULT_QR_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrTokenClaims {
    /// Session ID, duplicated as `id` and `sub`.
    id: String,
    sub: String,
    session_id: String,
    kind: TokenKind,
    iss: String,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    /// Geofence radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
}

/// Decoded, verified contents of a QR token.
#[derive(Debug, Clone, PartialEq)]
pub struct QrPayload {
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub geofence: Option<Geofence>,
}

/// A freshly signed QR token.
#[derive(Debug, Clone)]
pub struct IssuedQrToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::TokenInvalid(format!("timestamp out of range: {secs}")))
}

/// Issues and verifies QR tokens with a secret fixed at construction.
#[derive(Clone)]
pub struct QrTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    default_ttl_secs: u64,
}

impl QrTokenCodec {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            encoding_key: token::encoding_key(config)?,
            decoding_key: token::decoding_key(config)?,
            validation: token::validation(&config.jwt_issuer),
            issuer: config.jwt_issuer.clone(),
            default_ttl_secs: config.qr_token_ttl_secs,
        })
    }

    /// Configured default lifetime.
    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    /// Issue a token for `session_id` valid for `ttl_secs` from now.
    pub fn issue(
        &self,
        session_id: Uuid,
        ttl_secs: u64,
        geofence: Option<Geofence>,
    ) -> Result<IssuedQrToken, AuthError> {
        self.issue_at(session_id, ttl_secs, geofence, Utc::now().timestamp())
    }

    pub fn issue_at(
        &self,
        session_id: Uuid,
        ttl_secs: u64,
        geofence: Option<Geofence>,
        now: i64,
    ) -> Result<IssuedQrToken, AuthError> {
        if ttl_secs == 0 {
            return Err(AuthError::InvalidInput("QR token TTL must be positive".into()));
        }
        if let Some(fence) = &geofence {
            fence
                .validate()
                .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        }

        let exp = token::expiry(now, ttl_secs)?;
        let id = session_id.to_string();
        let claims = QrTokenClaims {
            id: id.clone(),
            sub: id.clone(),
            session_id: id,
            kind: TokenKind::Qr,
            iss: self.issuer.clone(),
            iat: now,
            exp,
            lat: geofence.map(|g| g.lat),
            lng: geofence.map(|g| g.lng),
            radius: geofence.map(|g| g.radius_meters),
        };

        Ok(IssuedQrToken {
            token: token::encode(&claims, &self.encoding_key)?,
            expires_at: timestamp(exp)?,
        })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<QrPayload, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, algorithm, issuer, kind and shape, then require
    /// `now <= exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<QrPayload, AuthError> {
        let claims: QrTokenClaims = token::decode(token, &self.decoding_key, &self.validation)?;

        if claims.kind != TokenKind::Qr {
            return Err(AuthError::TokenInvalid("not a QR token".into()));
        }
        if now > claims.exp {
            debug!(exp = claims.exp, now, "QR token expired");
            return Err(AuthError::TokenExpired);
        }

        let session_id = Uuid::parse_str(&claims.session_id)
            .map_err(|e| AuthError::TokenInvalid(format!("bad session id: {e}")))?;
        if claims.id != claims.session_id {
            return Err(AuthError::TokenInvalid("id does not match sessionId".into()));
        }

        let geofence = match (claims.lat, claims.lng, claims.radius) {
            (None, None, None) => None,
            (Some(lat), Some(lng), Some(radius)) => Some(
                Geofence::new(lat, lng, radius)
                    .map_err(|e| AuthError::TokenInvalid(e.to_string()))?,
            ),
            _ => {
                return Err(AuthError::TokenInvalid("incomplete geofence".into()));
            }
        };

        Ok(QrPayload {
            session_id,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
            geofence,
        })
    }
}
