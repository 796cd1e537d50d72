//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must make each
//! mutating call atomic with respect to every other call on the same
//! repository: two concurrent writes never overwrite one another.

use chrono::NaiveTime;
use uuid::Uuid;

use crate::error::UpasthitiResult;
use crate::models::{
    attendance::{AttendanceRecord, CreateAttendanceRecord},
    session::{CreateSession, Session},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the (lower-cased) email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = UpasthitiResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpasthitiResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = UpasthitiResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Class sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = UpasthitiResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpasthitiResult<Session>> + Send;
    /// All sessions in insertion order.
    fn list(&self) -> impl Future<Output = UpasthitiResult<Vec<Session>>> + Send;
    fn update_times(
        &self,
        id: Uuid,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> impl Future<Output = UpasthitiResult<Session>> + Send;
}

// ---------------------------------------------------------------------------
// Attendance (append-only)
// ---------------------------------------------------------------------------

pub trait AttendanceRepository: Send + Sync {
    fn append(
        &self,
        input: CreateAttendanceRecord,
    ) -> impl Future<Output = UpasthitiResult<AttendanceRecord>> + Send;
    /// All records in the order their appends completed.
    fn list(&self) -> impl Future<Output = UpasthitiResult<Vec<AttendanceRecord>>> + Send;
    fn list_by_session(
        &self,
        session_id: Uuid,
    ) -> impl Future<Output = UpasthitiResult<Vec<AttendanceRecord>>> + Send;
}
