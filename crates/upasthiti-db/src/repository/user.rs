//! JSON-file implementation of [`UserRepository`].

use std::sync::Arc;

use chrono::Utc;
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::models::user::{CreateUser, User};
use upasthiti_core::repository::UserRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::store::JsonStore;

/// JSON-file implementation of the User repository.
#[derive(Clone)]
pub struct JsonUserRepository {
    store: Arc<JsonStore<User>>,
}

impl JsonUserRepository {
    pub fn new(store: Arc<JsonStore<User>>) -> Self {
        Self { store }
    }
}

impl UserRepository for JsonUserRepository {
    async fn create(&self, input: CreateUser) -> UpasthitiResult<User> {
        let email = input.email.trim().to_lowercase();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email,
            password_hash: input.password_hash,
            role: input.role,
            avatar: None,
            created_at: Utc::now(),
        };

        // Checked under the store lock.
        self.store
            .update(move |users| {
                if users.iter().any(|u| u.email == user.email) {
                    return Err(UpasthitiError::AlreadyExists {
                        entity: "user".into(),
                    });
                }
                users.push(user.clone());
                Ok(user)
            })
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> UpasthitiResult<User> {
        self.store
            .find(|u| u.id == id)
            .await
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn get_by_email(&self, email: &str) -> UpasthitiResult<User> {
        let email = email.trim().to_lowercase();
        self.store
            .find(|u| u.email == email)
            .await
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: format!("email={email}"),
                }
                .into()
            })
    }
}
