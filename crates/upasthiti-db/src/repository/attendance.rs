//! JSON-file implementation of [`AttendanceRepository`].

use std::sync::Arc;

use chrono::Utc;
use upasthiti_core::error::UpasthitiResult;
use upasthiti_core::models::attendance::{AttendanceRecord, CreateAttendanceRecord};
use upasthiti_core::repository::AttendanceRepository;
use uuid::Uuid;

use crate::store::JsonStore;

/// JSON-file implementation of the append-only attendance log.
#[derive(Clone)]
pub struct JsonAttendanceRepository {
    store: Arc<JsonStore<AttendanceRecord>>,
}

impl JsonAttendanceRepository {
    pub fn new(store: Arc<JsonStore<AttendanceRecord>>) -> Self {
        Self { store }
    }
}

impl AttendanceRepository for JsonAttendanceRepository {
    async fn append(&self, input: CreateAttendanceRecord) -> UpasthitiResult<AttendanceRecord> {
        // Stamped under the lock so timestamps follow log order.
        self.store
            .update(move |records| {
                let record = AttendanceRecord {
                    id: Uuid::new_v4(),
                    session_id: input.session_id,
                    actor_id: input.actor_id,
                    method: input.method,
                    timestamp: Utc::now(),
                };
                records.push(record.clone());
                Ok(record)
            })
            .await
    }

    async fn list(&self) -> UpasthitiResult<Vec<AttendanceRecord>> {
        Ok(self.store.read().await)
    }

    async fn list_by_session(&self, session_id: Uuid) -> UpasthitiResult<Vec<AttendanceRecord>> {
        let mut records = self.store.read().await;
        records.retain(|r| r.session_id == session_id);
        Ok(records)
    }
}
