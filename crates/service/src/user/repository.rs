use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::domain::User;
use super::errors::UserError;
use crate::storage::json_map_store::JsonMapStore;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Store a new user. Fails with a conflict when the username or the email
    /// (compared case-insensitively) is already present.
    async fn insert(&self, user: User) -> Result<User, UserError>;
}

/// Repository backed by a [`JsonMapStore`] keyed by user id.
pub struct StoredUserRepository {
    store: Arc<JsonMapStore<Uuid, User>>,
}

impl StoredUserRepository {
    pub fn new(store: Arc<JsonMapStore<Uuid, User>>) -> Self {
        Self { store }
    }

    /// Open (or create) a JSON file of users.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, UserError> {
        Ok(Self::new(JsonMapStore::open(path).await?))
    }

    pub fn in_memory() -> Self {
        Self::new(JsonMapStore::in_memory())
    }
}

#[async_trait]
impl UserRepository for StoredUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        Ok(self.store.find(|u| u.username == username).await)
    }

    async fn insert(&self, user: User) -> Result<User, UserError> {
        self.store
            .update_map(|users| {
                if users.values().any(|u| u.username == user.username) {
                    return Err(UserError::UsernameTaken);
                }
                if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                    return Err(UserError::EmailTaken);
                }
                users.insert(user.id, user.clone());
                Ok(user)
            })
            .await
    }
}
