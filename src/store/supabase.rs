//! Supabase (PostgREST) user store
//!
//! Talks to `{url}/rest/v1/{table}` with the service key. Expected columns:
//! `id`, `username` (unique), `password` (hash), `created_at`.

use axum::async_trait;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use super::{StoreError, UserRecord, UserStore, UserSummary};
use crate::config::Config;

/// Row sent on insert
#[derive(Serialize)]
struct NewUserRow<'a> {
    username: &'a str,
    password: &'a str,
}

/// PostgREST-backed [`UserStore`]
#[derive(Debug, Clone)]
pub struct SupabaseUserStore {
    http: reqwest::Client,
    table_url: String,
    service_key: SecretString,
}

impl SupabaseUserStore {
    pub fn new(
        base_url: &str,
        service_key: SecretString,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            service_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(
            &config.supabase_url,
            config.supabase_key.clone(),
            &config.users_table,
            config.outbound_timeout,
        )
    }

    /// Attach the service-key headers
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key)
            .header(header::AUTHORIZATION, format!("Bearer {}", key))
    }

    /// Turn a non-success response into a [`StoreError`]
    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // unique_violation surfaces as 409 Conflict
        if status == StatusCode::CONFLICT {
            return Err(StoreError::DuplicateUsername);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl UserStore for SupabaseUserStore {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let rows = [NewUserRow {
            username,
            password: password_hash,
        }];

        let request = self
            .http
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&rows);

        let response = Self::check(self.authorized(request).send().await?).await?;
        let inserted: Vec<UserRecord> = response.json().await?;

        inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let filter = format!("eq.{}", username);
        let request = self.http.get(&self.table_url).query(&[
            ("select", "*"),
            ("username", filter.as_str()),
            ("limit", "1"),
        ]);

        let response = Self::check(self.authorized(request).send().await?).await?;
        let users: Vec<UserRecord> = response.json().await?;

        Ok(users.into_iter().next())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let request = self.http.get(&self.table_url).query(&[
            ("select", "id,username,created_at"),
            ("order", "created_at.asc"),
        ]);

        let response = Self::check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }
}
