//! Account flows: register, login, password change, logout.

use thiserror::Error;

use crate::api::{ApiError, ChangePasswordRequest, LoginRequest, PlantApi, RegisterRequest};
use crate::models::Session;
use crate::services::DatabaseService;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("New passwords do not match")]
    PasswordMismatch,
    #[error("Login failed, check your email and password")]
    LoginFailed,
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("No user is logged in")]
    NotAuthenticated,
    #[error("Connection error: {0}")]
    Remote(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] crate::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// Signed-in user after a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedInUser {
    pub user_id: i64,
    pub name: String,
    /// Cached plants of a previous user were dropped
    pub cache_cleared: bool,
}

#[derive(Clone)]
pub struct AccountService<A: PlantApi> {
    db: DatabaseService,
    api: A,
}

impl<A: PlantApi> AccountService<A> {
    pub const fn new(db: DatabaseService, api: A) -> Self {
        Self { db, api }
    }

    pub async fn session(&self) -> AccountResult<Session> {
        Ok(self.db.load_session().await?)
    }

    /// Create an account. The new user is not logged in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AccountResult<i64> {
        let name = required(name, "Name")?;
        let email = required(email, "Email")?;
        required(password, "Password")?;

        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.register(&request).await {
            Ok(response) => {
                tracing::info!("Registered user {}", response.id);
                Ok(response.id)
            }
            Err(ApiError::Api { message, .. }) => Err(AccountError::RegistrationFailed(message)),
            Err(error) => Err(AccountError::Remote(error)),
        }
    }

    /// Log in and remember the user.
    ///
    /// Logging in as someone else than the previous user drops the cached
    /// plants, logs and pending deletes of that user.
    pub async fn login(&self, email: &str, password: &str) -> AccountResult<LoggedInUser> {
        let email = required(email, "Email")?;
        required(password, "Password")?;

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await.map_err(|error| {
            tracing::warn!("Login failed: {error}");
            AccountError::LoginFailed
        })?;

        let previous = self.db.last_user_id().await?;
        let switched = previous.is_some_and(|last| last != response.user_id)
            || self.db.has_plants_of_other_users(response.user_id).await?;
        if switched {
            tracing::info!(
                "Account switch from {:?} to {}, clearing local cache",
                previous,
                response.user_id
            );
            self.db.clear_local_data().await?;
        }

        self.db
            .save_user_session(response.user_id, &response.name)
            .await?;
        tracing::info!("Logged in as user {}", response.user_id);

        Ok(LoggedInUser {
            user_id: response.user_id,
            name: response.name,
            cache_cleared: switched,
        })
    }

    /// Change the password of the logged-in user.
    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> AccountResult<()> {
        required(current, "Current password")?;
        required(new, "New password")?;
        if new != confirm {
            return Err(AccountError::PasswordMismatch);
        }
        let user_id = self
            .db
            .user_id()
            .await?
            .ok_or(AccountError::NotAuthenticated)?;

        let request = ChangePasswordRequest {
            user_id,
            old_password: current.to_string(),
            new_password: new.to_string(),
        };

        match self.api.change_password(&request).await {
            Ok(()) => {
                tracing::info!("Password changed for user {user_id}");
                Ok(())
            }
            Err(ApiError::Api { status, .. }) => {
                tracing::debug!("Password change rejected with HTTP {status}");
                Err(AccountError::IncorrectPassword)
            }
            Err(error) => Err(AccountError::Remote(error)),
        }
    }

    /// Forget the user and everything cached for them.
    pub async fn logout(&self) -> AccountResult<()> {
        self.db.logout().await?;
        self.db.clear_local_data().await?;
        tracing::info!("Logged out");
        Ok(())
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> AccountResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(AccountError::MissingField(field))
    } else {
        Ok(value)
    }
}
