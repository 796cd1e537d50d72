//! Shared handler state.

use std::sync::Arc;

use upasthiti_attendance::{AttendanceRecorder, SessionRegistry};
use upasthiti_auth::{AuthConfig, AuthService, QrTokenCodec};
use upasthiti_core::error::UpasthitiResult;
use upasthiti_db::DbManager;
use upasthiti_db::repository::{
    JsonAttendanceRepository, JsonSessionRepository, JsonUserRepository,
};

pub type Accounts = AuthService<JsonUserRepository>;
pub type Sessions = SessionRegistry<JsonSessionRepository>;
pub type Attendance = AttendanceRecorder<JsonSessionRepository, JsonAttendanceRepository>;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Accounts>,
    pub sessions: Arc<Sessions>,
    pub attendance: Arc<Attendance>,
}

impl AppState {
    /// Wire the services over already opened stores.
    pub fn new(db: &DbManager, auth_config: AuthConfig) -> UpasthitiResult<Self> {
        let codec = QrTokenCodec::new(&auth_config)?;

        Ok(Self {
            auth: Arc::new(AuthService::new(db.users(), auth_config)),
            sessions: Arc::new(SessionRegistry::new(db.sessions())),
            attendance: Arc::new(AttendanceRecorder::new(
                db.sessions(),
                db.attendance(),
                codec,
            )),
        })
    }
}
