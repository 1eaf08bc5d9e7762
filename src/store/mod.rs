//! User persistence
//!
//! The external store owns identifiers, timestamps and username uniqueness.
//! This crate only inserts and reads rows through the [`UserStore`] trait.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryUserStore;
pub use supabase::SupabaseUserStore;

use axum::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the store
///
/// Keeps its JSON type, so integer keys stay integers in responses and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Int(id) => write!(f, "{}", id),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// Full user row, including the password hash
///
/// Never serialized back to clients; see [`UserSummary`].
#[derive(Clone, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub created_at: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Public projection of a user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub created_at: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            username: record.username.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

/// Errors from the user store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("store returned an unexpected response: {0}")]
    Decode(String),
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Access to the external user table
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user and return the stored row
    ///
    /// Uniqueness of `username` is enforced by the store, not pre-checked.
    async fn insert_user(&self, username: &str, password_hash: &str)
        -> Result<UserRecord, StoreError>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// All users, oldest first
    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_keeps_json_type() {
        let int: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(int, UserId::Int(42));
        assert_eq!(serde_json::to_string(&int).unwrap(), "42");

        let text: UserId = serde_json::from_str("\"0b7c-uuid\"").unwrap();
        assert_eq!(text, UserId::Text("0b7c-uuid".to_string()));
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"0b7c-uuid\"");
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::Int(7).to_string(), "7");
        assert_eq!(UserId::Text("abc".to_string()).to_string(), "abc");
    }

    #[test]
    fn test_record_reads_password_column() {
        let json = r#"{"id": 1, "username": "alice", "password": "$argon2id$hash", "created_at": "2025-01-01T00:00:00+00:00"}"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.username, "alice");
        assert_eq!(record.password_hash, "$argon2id$hash");
    }

    #[test]
    fn test_record_debug_redacts_hash() {
        let record = UserRecord {
            id: UserId::Int(1),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret-hash".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };
        let debug = format!("{:?}", record);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret-hash"));
    }

    #[test]
    fn test_summary_has_no_password() {
        let record = UserRecord {
            id: UserId::Int(1),
            username: "alice".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&UserSummary::from(&record)).unwrap();
        assert!(json.contains("\"username\":\"alice\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
