use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use upasthiti_core::error::UpasthitiError;
use upasthiti_core::geo::GeoPoint;
use upasthiti_core::models::attendance::AttendanceRecord;
use upasthiti_core::models::user::Role;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

const SCANNERS: &[Role] = &[Role::Student, Role::Teacher, Role::Admin];
const SUPERVISORS: &[Role] = &[Role::Teacher, Role::Admin];

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(list_attendance))
        .route("/attendance/scan", post(scan))
        .route("/attendance/manual", post(manual))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct ScanRequest {
    token: String,
    current_lat: Option<f64>,
    current_lng: Option<f64>,
}

impl ScanRequest {
    /// A location counts only when both coordinates are present.
    fn location(&self) -> Option<GeoPoint> {
        match (self.current_lat, self.current_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ManualRequest {
    session_id: Uuid,
    student_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceQuery {
    session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct EntryResponse {
    ok: bool,
    entry: AttendanceRecord,
}

#[derive(Debug, Serialize)]
struct AttendanceResponse {
    attendance: Vec<AttendanceRecord>,
}

async fn scan(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<ScanRequest>,
) -> ApiResult<Json<EntryResponse>> {
    let actor = user.require(SCANNERS)?;
    if req.token.trim().is_empty() {
        return Err(UpasthitiError::validation("token is required").into());
    }
    let entry = state
        .attendance
        .record_via_token(&req.token, actor.id, req.location())
        .await?;
    Ok(Json(EntryResponse { ok: true, entry }))
}

async fn manual(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<ManualRequest>,
) -> ApiResult<Json<EntryResponse>> {
    user.require(SUPERVISORS)?;
    let entry = state
        .attendance
        .record_manual(req.session_id, req.student_id)
        .await?;
    Ok(Json(EntryResponse { ok: true, entry }))
}

async fn list_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> ApiResult<Json<AttendanceResponse>> {
    user.require(SUPERVISORS)?;
    let attendance = match query.session_id {
        Some(session_id) => state.attendance.list_for_session(session_id).await?,
        None => state.attendance.list().await?,
    };
    Ok(Json(AttendanceResponse { attendance }))
}
