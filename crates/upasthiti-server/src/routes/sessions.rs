use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::geo::Geofence;
use upasthiti_core::models::session::{Session, SessionFields};
use upasthiti_core::models::user::Role;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::state::AppState;

const SESSION_MANAGERS: &[Role] = &[Role::Teacher, Role::Admin];

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session).patch(update_times))
        .route("/sessions/{id}/qr", post(issue_qr))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct CreateSessionRequest {
    department: String,
    subject: String,
    start_time: String,
    end_time: String,
    start_date: String,
    end_date: String,
}

impl From<CreateSessionRequest> for SessionFields {
    fn from(req: CreateSessionRequest) -> Self {
        Self {
            department: req.department,
            subject: req.subject,
            start_time: req.start_time,
            end_time: req.end_time,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct UpdateTimesRequest {
    start_time: String,
    end_time: String,
}

/// Optional geofence for a QR token. All three fields or none.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct QrRequest {
    lat: Option<f64>,
    lng: Option<f64>,
    /// Radius in meters.
    radius: Option<f64>,
}

impl QrRequest {
    fn geofence(&self) -> UpasthitiResult<Option<Geofence>> {
        match (self.lat, self.lng, self.radius) {
            (None, None, None) => Ok(None),
            (Some(lat), Some(lng), Some(radius)) => Ok(Some(Geofence {
                lat,
                lng,
                radius_meters: radius,
            })),
            _ => Err(UpasthitiError::validation(
                "geofence needs lat, lng and radius together",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session: Session,
}

#[derive(Debug, Serialize)]
struct SessionsResponse {
    sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QrResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// An id that is not a UUID cannot name any session.
fn parse_session_id(raw: &str) -> UpasthitiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| UpasthitiError::not_found("Session", raw))
}

async fn create_session(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let owner = user.require(SESSION_MANAGERS)?;
    let session = state.sessions.create(owner.id, req.into()).await?;
    Ok(Json(SessionResponse { session }))
}

async fn list_sessions(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<SessionsResponse>> {
    let sessions = state.sessions.list().await?;
    Ok(Json(SessionsResponse { sessions }))
}

async fn get_session(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.get(parse_session_id(&id)?).await?;
    Ok(Json(SessionResponse { session }))
}

async fn update_times(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateTimesRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let actor = user.require(SESSION_MANAGERS)?;
    let session = state
        .sessions
        .update_times(parse_session_id(&id)?, actor, &req.start_time, &req.end_time)
        .await?;
    Ok(Json(SessionResponse { session }))
}

/// The body is optional: an empty body issues a token without a geofence.
async fn issue_qr(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<String>,
    body: Bytes,
) -> ApiResult<Json<QrResponse>> {
    user.require(SESSION_MANAGERS)?;
    let id = parse_session_id(&id)?;

    let req: QrRequest = if body.iter().all(u8::is_ascii_whitespace) {
        QrRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| UpasthitiError::validation(format!("invalid request body: {e}")))?
    };

    let issued = state.attendance.issue_token(id, req.geofence()?).await?;
    Ok(Json(QrResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
