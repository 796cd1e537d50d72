//! Account service — signup, login and bearer authentication.

use std::sync::OnceLock;

use tracing::{info, warn};
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::models::user::{CreateUser, PublicUser, Role};
use upasthiti_core::repository::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the signup flow.
#[derive(Debug)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful signup/login result.
#[derive(Debug)]
pub struct AuthOutput {
    /// Signed HS256 access token.
    pub access_token: String,
    pub user: PublicUser,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Fail with `AuthorizationDenied` unless `user` holds one of `allowed`.
pub fn require_role(user: &PublicUser, allowed: &[Role]) -> UpasthitiResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(UpasthitiError::AuthorizationDenied {
            reason: format!("role '{}' may not perform this action", user.role),
        })
    }
}

/// Account service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the storage crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
    /// Hash verified against when the email is unknown.
    dummy_hash: OnceLock<String>,
}

const DUMMY_PASSWORD: &str = "upasthiti-unknown-account";

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self {
            user_repo,
            config,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Register a new account and issue an access token.
    pub async fn signup(&self, input: SignupInput) -> UpasthitiResult<AuthOutput> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(UpasthitiError::validation("missing fields"));
        }
        if !email.contains('@') {
            return Err(UpasthitiError::validation("email is malformed"));
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(UpasthitiError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(CreateUser {
                name: name.to_string(),
                email,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User signed up");

        self.issue_for(user.into())
    }

    /// Authenticate with email + password and issue an access token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller, in the response and in the Argon2 work done.
    pub async fn login(&self, input: LoginInput) -> UpasthitiResult<AuthOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(UpasthitiError::NotFound { .. }) => {
                let _ = password::verify_password(
                    &input.password,
                    self.dummy_hash()?,
                    self.config.pepper.as_deref(),
                );
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue_for(user.into())
    }

    /// Resolve a bearer access token to the user it was issued for.
    pub async fn authenticate(&self, bearer: &str) -> UpasthitiResult<PublicUser> {
        let claims = token::decode_access_token(bearer, &self.config)?;
        let user_id = token::subject_user_id(&claims)?;

        match self.user_repo.get_by_id(user_id).await {
            Ok(user) => Ok(user.into()),
            Err(UpasthitiError::NotFound { .. }) => Err(UpasthitiError::AuthenticationFailed {
                reason: "user not found".into(),
            }),
            Err(e) => Err(e),
        }
    }

    fn dummy_hash(&self) -> Result<&str, AuthError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = password::hash_password(DUMMY_PASSWORD, self.config.pepper.as_deref())?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    fn issue_for(&self, user: PublicUser) -> UpasthitiResult<AuthOutput> {
        let access_token = token::issue_access_token(user.id, &self.config)?;
        Ok(AuthOutput {
            access_token,
            user,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}
