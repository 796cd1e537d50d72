//! JSON-file implementation of [`SessionRepository`].

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::models::session::{CreateSession, Session};
use upasthiti_core::repository::SessionRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::store::JsonStore;

fn not_found(id: Uuid) -> UpasthitiError {
    DbError::NotFound {
        entity: "session".into(),
        id: id.to_string(),
    }
    .into()
}

/// JSON-file implementation of the Session repository.
#[derive(Clone)]
pub struct JsonSessionRepository {
    store: Arc<JsonStore<Session>>,
}

impl JsonSessionRepository {
    pub fn new(store: Arc<JsonStore<Session>>) -> Self {
        Self { store }
    }
}

impl SessionRepository for JsonSessionRepository {
    async fn create(&self, input: CreateSession) -> UpasthitiResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            subject: input.subject,
            department: input.department,
            start_time: input.start_time,
            end_time: input.end_time,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Utc::now(),
        };

        self.store.append(session).await.map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> UpasthitiResult<Session> {
        self.store
            .find(|s| s.id == id)
            .await
            .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> UpasthitiResult<Vec<Session>> {
        Ok(self.store.read().await)
    }

    async fn update_times(
        &self,
        id: Uuid,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> UpasthitiResult<Session> {
        self.store
            .update(move |sessions| {
                let session = sessions
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| not_found(id))?;
                session.start_time = start_time;
                session.end_time = end_time;
                Ok(session.clone())
            })
            .await
    }
}
