use std::sync::Arc;

use chrono::{DateTime, Utc};
use db::{
    DBService,
    models::user::{LoginUser, RegisterUser, User},
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use ts_rs::TS;

use super::{
    auth::{AuthProvider, VerifiedToken},
    error::ServiceError,
    password::{hash_password, verify_password_or_dummy},
    validation::Validator,
};

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration, login and token-to-user resolution.
#[derive(Clone)]
pub struct AuthService {
    db: DBService,
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    pub fn new(db: DBService, provider: Arc<dyn AuthProvider>) -> Self {
        Self { db, provider }
    }

    #[instrument(name = "auth.register", skip(self, payload))]
    pub async fn register(&self, payload: &RegisterUser) -> Result<AuthSession, ServiceError> {
        Validator::new()
            .email("email", &payload.email)
            .name("name", &payload.name)
            .password("password", &payload.password)
            .finish()?;

        let password = payload.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await?
            .map_err(ServiceError::PasswordHash)?;
        let user = User::create(
            self.db.pool(),
            payload.email.trim(),
            payload.name.trim(),
            &password_hash,
        )
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict("email is already registered".to_string())
            }
            _ => ServiceError::Storage(err),
        })?;

        info!(user_id = user.id, "user registered");
        self.session_for(user)
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(name = "auth.login", skip(self, payload))]
    pub async fn login(&self, payload: &LoginUser) -> Result<AuthSession, ServiceError> {
        Validator::new().email("email", &payload.email).finish()?;

        let user = User::find_by_email(self.db.pool(), payload.email.trim()).await?;

        let password = payload.password.clone();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || {
            verify_password_or_dummy(&password, stored.as_deref())
        })
        .await?;

        match user {
            Some(user) if verified => self.session_for(user),
            Some(user) => {
                warn!(user_id = user.id, "login failed: bad password");
                Err(ServiceError::Unauthorized)
            }
            None => {
                warn!("login failed: unknown email");
                Err(ServiceError::Unauthorized)
            }
        }
    }

    #[instrument(name = "auth.current_user", skip(self))]
    pub async fn current_user(&self, user_id: i64) -> Result<User, ServiceError> {
        User::find_by_id(self.db.pool(), user_id)
            .await?
            .ok_or(ServiceError::Unauthorized)
    }

    /// Verify a bearer token and load the user it names.
    pub async fn authenticate(&self, token: &str) -> Result<(User, VerifiedToken), ServiceError> {
        let verified = self.provider.verify(token).map_err(|err| {
            warn!(?err, "rejected access token");
            ServiceError::Unauthorized
        })?;
        let user = self.current_user(verified.user_id).await?;
        Ok((user, verified))
    }

    fn session_for(&self, user: User) -> Result<AuthSession, ServiceError> {
        let issued = self.provider.issue(user.id)?;
        Ok(AuthSession {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}
