use axum::async_trait;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserId, UserRecord, UserStore, UserSummary};

/// Process-local user store
///
/// Mirrors the external table's contract: store-assigned ids and timestamps,
/// unique usernames, rows kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername);
        }

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| StoreError::Decode(format!("timestamp formatting failed: {}", e)))?;

        let record = UserRecord {
            id: UserId::Text(Uuid::new_v4().to_string()),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        };
        users.push(record.clone());

        Ok(record)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}
