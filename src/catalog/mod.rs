//! Upstream game catalog
//!
//! Payloads are relayed as opaque JSON; nothing here parses game fields.

pub mod rawg;

pub use rawg::RawgCatalog;

use axum::async_trait;
use serde_json::Value;

/// Errors from the game catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("game not found")]
    NotFound,
    #[error("catalog responded with status {0}")]
    Status(u16),
    #[error("catalog response missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid catalog base url: {0}")]
    InvalidUrl(String),
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Read-only access to the game catalog
#[async_trait]
pub trait GameCatalog: Send + Sync {
    /// Search games by name, returning the upstream `results` array
    async fn search(&self, query: &str) -> Result<Value, CatalogError>;

    /// Fetch one game by id or slug
    async fn game(&self, id: &str) -> Result<Value, CatalogError>;
}
