//! Attendance recorder — QR token scans and manual entries.
//!
//! A scan moves through `Presented → Decoded → SessionResolved →
//! (GeofenceChecked) → Recorded`. Any failed step rejects the scan and
//! nothing is written; the append is always the last step.

use chrono::Utc;
use tracing::{info, warn};
use upasthiti_auth::error::AuthError;
use upasthiti_auth::qr::{IssuedQrToken, QrPayload, QrTokenCodec};
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::geo::{GeoPoint, Geofence};
use upasthiti_core::models::attendance::{
    AttendanceMethod, AttendanceRecord, CreateAttendanceRecord,
};
use upasthiti_core::models::session::Session;
use upasthiti_core::repository::{AttendanceRepository, SessionRepository};
use uuid::Uuid;

/// Attendance recorder.
///
/// Generic over repository implementations so that attendance logic
/// has no dependency on the storage crate.
pub struct AttendanceRecorder<S: SessionRepository, A: AttendanceRepository> {
    session_repo: S,
    attendance_repo: A,
    codec: QrTokenCodec,
}

impl<S: SessionRepository, A: AttendanceRepository> AttendanceRecorder<S, A> {
    pub fn new(session_repo: S, attendance_repo: A, codec: QrTokenCodec) -> Self {
        Self {
            session_repo,
            attendance_repo,
            codec,
        }
    }

    /// Issue a QR token for an existing session with the default TTL.
    pub async fn issue_token(
        &self,
        session_id: Uuid,
        geofence: Option<Geofence>,
    ) -> UpasthitiResult<IssuedQrToken> {
        self.issue_token_with_ttl(session_id, self.codec.default_ttl_secs(), geofence)
            .await
    }

    pub async fn issue_token_with_ttl(
        &self,
        session_id: Uuid,
        ttl_secs: u64,
        geofence: Option<Geofence>,
    ) -> UpasthitiResult<IssuedQrToken> {
        let session = self.session_repo.get_by_id(session_id).await?;
        let issued = self.codec.issue(session.id, ttl_secs, geofence)?;

        info!(
            session_id = %session.id,
            geofenced = geofence.is_some(),
            expires_at = %issued.expires_at,
            "QR token issued"
        );
        Ok(issued)
    }

    /// Record attendance for `actor_id` from a scanned QR token.
    pub async fn record_via_token(
        &self,
        token: &str,
        actor_id: Uuid,
        location: Option<GeoPoint>,
    ) -> UpasthitiResult<AttendanceRecord> {
        self.record_via_token_at(token, actor_id, location, Utc::now().timestamp())
            .await
    }

    /// As [`record_via_token`](Self::record_via_token), verifying expiry
    /// against `now` (Unix seconds).
    pub async fn record_via_token_at(
        &self,
        token: &str,
        actor_id: Uuid,
        location: Option<GeoPoint>,
        now: i64,
    ) -> UpasthitiResult<AttendanceRecord> {
        let payload = self.decode(token, actor_id, now)?;
        let session = self.resolve(payload.session_id).await?;

        if let Some(fence) = &payload.geofence {
            let Some(point) = location else {
                warn!(session_id = %session.id, actor_id = %actor_id, "Scan rejected: location required");
                return Err(UpasthitiError::LocationRequired);
            };
            point.validate()?;

            match fence.check(&point) {
                Ok(distance) => {
                    info!(
                        session_id = %session.id,
                        distance_meters = distance,
                        radius_meters = fence.radius_meters,
                        "Geofence check passed"
                    );
                }
                Err(e) => {
                    warn!(session_id = %session.id, actor_id = %actor_id, error = %e, "Scan rejected: out of range");
                    return Err(e);
                }
            }
        }

        self.append(session.id, actor_id, AttendanceMethod::Qr).await
    }

    /// Record attendance directly, bypassing token and geofence checks.
    pub async fn record_manual(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
    ) -> UpasthitiResult<AttendanceRecord> {
        let session = self.resolve(session_id).await?;
        self.append(session.id, actor_id, AttendanceMethod::Manual)
            .await
    }

    pub async fn list(&self) -> UpasthitiResult<Vec<AttendanceRecord>> {
        self.attendance_repo.list().await
    }

    pub async fn list_for_session(&self, session_id: Uuid) -> UpasthitiResult<Vec<AttendanceRecord>> {
        self.attendance_repo.list_by_session(session_id).await
    }

    fn decode(&self, token: &str, actor_id: Uuid, now: i64) -> UpasthitiResult<QrPayload> {
        self.codec.verify_at(token, now).map_err(|e| {
            match &e {
                AuthError::Crypto(msg) => {
                    warn!(actor_id = %actor_id, error = %msg, "Scan rejected: codec failure");
                }
                other => {
                    warn!(actor_id = %actor_id, reason = %other, "Scan rejected: invalid token");
                }
            }
            UpasthitiError::InvalidToken
        })
    }

    async fn resolve(&self, session_id: Uuid) -> UpasthitiResult<Session> {
        match self.session_repo.get_by_id(session_id).await {
            Ok(session) => Ok(session),
            Err(UpasthitiError::NotFound { .. }) => {
                warn!(session_id = %session_id, "Attendance rejected: unknown session");
                Err(UpasthitiError::UnknownSession {
                    session_id: session_id.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn append(
        &self,
        session_id: Uuid,
        actor_id: Uuid,
        method: AttendanceMethod,
    ) -> UpasthitiResult<AttendanceRecord> {
        let record = self
            .attendance_repo
            .append(CreateAttendanceRecord {
                session_id,
                actor_id,
                method,
            })
            .await?;

        info!(
            record_id = %record.id,
            session_id = %session_id,
            actor_id = %actor_id,
            method = ?method,
            "Attendance recorded"
        );
        Ok(record)
    }
}
