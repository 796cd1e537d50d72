//! Store lifecycle: data directory layout and collection handles.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use upasthiti_core::models::{attendance::AttendanceRecord, session::Session, user::User};

use crate::error::DbError;
use crate::repository::{JsonAttendanceRepository, JsonSessionRepository, JsonUserRepository};
use crate::store::JsonStore;

const USERS_FILE: &str = "users.json";
const SESSIONS_FILE: &str = "sessions.json";
const ATTENDANCE_FILE: &str = "attendance.json";

/// Configuration for the on-disk stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Directory holding `users.json`, `sessions.json` and
    /// `attendance.json`.
    pub data_dir: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Owns the three record collections.
///
/// Cloning is cheap and every clone shares the same stores, so exactly
/// one writer exists per file within the process.
#[derive(Clone)]
pub struct DbManager {
    users: Arc<JsonStore<User>>,
    sessions: Arc<JsonStore<Session>>,
    attendance: Arc<JsonStore<AttendanceRecord>>,
}

impl DbManager {
    /// Create the data directory if needed and open every collection.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        info!(data_dir = %config.data_dir.display(), "Opening JSON stores");

        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|e| DbError::io(&config.data_dir, e))?;

        let users = JsonStore::open(config.data_dir.join(USERS_FILE)).await?;
        let sessions = JsonStore::open(config.data_dir.join(SESSIONS_FILE)).await?;
        let attendance = JsonStore::open(config.data_dir.join(ATTENDANCE_FILE)).await?;

        info!("JSON stores ready");

        Ok(Self {
            users: Arc::new(users),
            sessions: Arc::new(sessions),
            attendance: Arc::new(attendance),
        })
    }

    pub fn users(&self) -> JsonUserRepository {
        JsonUserRepository::new(self.users.clone())
    }

    pub fn sessions(&self) -> JsonSessionRepository {
        JsonSessionRepository::new(self.sessions.clone())
    }

    pub fn attendance(&self) -> JsonAttendanceRepository {
        JsonAttendanceRepository::new(self.attendance.clone())
    }
}
