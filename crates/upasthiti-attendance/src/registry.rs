//! Session registry — creation, lookup and time edits of class sessions.

use chrono::{Local, NaiveDate};
use tracing::info;
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::models::session::{Session, SessionFields, parse_time_range};
use upasthiti_core::models::user::{PublicUser, Role};
use upasthiti_core::repository::SessionRepository;
use uuid::Uuid;

pub struct SessionRegistry<S: SessionRepository> {
    session_repo: S,
}

impl<S: SessionRepository> SessionRegistry<S> {
    pub fn new(session_repo: S) -> Self {
        Self { session_repo }
    }

    /// Validate `fields` and store a new session owned by `owner_id`.
    pub async fn create(&self, owner_id: Uuid, fields: SessionFields) -> UpasthitiResult<Session> {
        let input = fields.validate(owner_id)?;
        let session = self.session_repo.create(input).await?;

        info!(
            session_id = %session.id,
            owner_id = %owner_id,
            subject = %session.subject,
            "Session created"
        );
        Ok(session)
    }

    pub async fn list(&self) -> UpasthitiResult<Vec<Session>> {
        self.session_repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> UpasthitiResult<Session> {
        self.session_repo.get_by_id(id).await
    }

    /// Change start/end time, using the local calendar date as "today".
    pub async fn update_times(
        &self,
        id: Uuid,
        actor: &PublicUser,
        start_time: &str,
        end_time: &str,
    ) -> UpasthitiResult<Session> {
        self.update_times_on(id, actor, start_time, end_time, Local::now().date_naive())
            .await
    }

    /// Change start/end time as of `today`.
    ///
    /// Only the owner or an admin may edit, and only while `today` lies
    /// within the session's date range.
    pub async fn update_times_on(
        &self,
        id: Uuid,
        actor: &PublicUser,
        start_time: &str,
        end_time: &str,
        today: NaiveDate,
    ) -> UpasthitiResult<Session> {
        let session = self.session_repo.get_by_id(id).await?;

        if session.owner_id != actor.id && actor.role != Role::Admin {
            return Err(UpasthitiError::AuthorizationDenied {
                reason: "only the session owner may edit its times".into(),
            });
        }
        if !session.is_editable_on(today) {
            return Err(UpasthitiError::EditWindowClosed {
                session_id: session.id,
                start_date: session.start_date,
                end_date: session.end_date,
            });
        }

        let (start, end) = parse_time_range(start_time, end_time)?;
        let updated = self.session_repo.update_times(id, start, end).await?;

        info!(session_id = %id, actor_id = %actor.id, "Session times updated");
        Ok(updated)
    }
}
