//! Attendance log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMethod {
    Manual,
    Qr,
    Face,
}

/// One accepted attendance mark. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    /// The user whose attendance was recorded.
    pub actor_id: Uuid,
    pub method: AttendanceMethod,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAttendanceRecord {
    pub session_id: Uuid,
    pub actor_id: Uuid,
    pub method: AttendanceMethod,
}
