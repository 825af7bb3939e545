use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{CreateUserRequest, User};
use super::errors::UserError;
use super::repository::UserRepository;

/// What the HTTP layer needs from the account subsystem.
#[async_trait]
pub trait UserAccounts: Send + Sync {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError>;
    async fn login_user(&self, username: &str, password: &str) -> Result<User, UserError>;
}

/// Label stored alongside every hash produced by [`hash_password`].
pub const PASSWORD_ALGORITHM: &str = "argon2";

/// Account business service independent of web framework
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    fn validate(request: &CreateUserRequest) -> Result<(), UserError> {
        if request.username.trim().is_empty() {
            return Err(UserError::Validation("username must not be empty".into()));
        }
        if request.email.trim().is_empty() {
            return Err(UserError::Validation("email must not be empty".into()));
        }
        if request.password.is_empty() {
            return Err(UserError::Validation("password must not be empty".into()));
        }
        Ok(())
    }
}

async fn hash_password(password: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| UserError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| UserError::HashError(e.to_string()))?
}

async fn verify_password(password: String, hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|e| UserError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| UserError::HashError(e.to_string()))?
}

#[async_trait]
impl<R: UserRepository> UserAccounts for UserService<R> {
    /// Register a new user with a hashed password.
    ///
    /// Blank checks ignore surrounding whitespace; username and email are
    /// stored exactly as submitted so login matches them verbatim.
    ///
    /// # Examples
    /// ```
    /// use service::user::{CreateUserRequest, StoredUserRepository, UserAccounts, UserService};
    /// use std::sync::Arc;
    /// let repo = Arc::new(StoredUserRepository::in_memory());
    /// let svc = UserService::new(repo);
    /// let request = CreateUserRequest { username: "chef".into(), email: "chef@example.com".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.create_user(request)).unwrap();
    /// assert_eq!(user.username, "chef");
    /// ```
    #[instrument(skip(self, request), fields(username = %request.username, email = %request.email))]
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        Self::validate(&request)?;
        let CreateUserRequest { username, email, password } = request;

        if self.repo.find_by_username(&username).await?.is_some() {
            debug!("username already taken");
            return Err(UserError::UsernameTaken);
        }

        let password_hash = hash_password(password).await?;
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            password_algorithm: PASSWORD_ALGORITHM.to_string(),
            created_at: Utc::now(),
        };

        let user = self.repo.insert(user).await?;
        info!(user_id = %user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Look up a user by name and check the password.
    ///
    /// # Examples
    /// ```
    /// use service::user::{CreateUserRequest, StoredUserRepository, UserAccounts, UserService};
    /// use std::sync::Arc;
    /// let svc = UserService::new(Arc::new(StoredUserRepository::in_memory()));
    /// let created = tokio_test::block_on(svc.create_user(CreateUserRequest { username: "u".into(), email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// let user = tokio_test::block_on(svc.login_user("u", "Passw0rd")).unwrap();
    /// assert_eq!(user.id, created.id);
    /// ```
    #[instrument(skip(self, password))]
    async fn login_user(&self, username: &str, password: &str) -> Result<User, UserError> {
        let user = self.repo
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFound)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user_logged_in");
        Ok(user)
    }
}
