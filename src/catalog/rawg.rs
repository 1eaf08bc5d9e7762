use axum::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;

use super::{CatalogError, GameCatalog};
use crate::config::Config;

/// Results requested per search
pub const SEARCH_PAGE_SIZE: u32 = 40;

/// RAWG-backed [`GameCatalog`]
#[derive(Debug, Clone)]
pub struct RawgCatalog {
    http: reqwest::Client,
    games_endpoint: Url,
    api_key: SecretString,
}

impl RawgCatalog {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let games_endpoint = Url::parse(&format!("{}/games", base_url.trim_end_matches('/')))
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if games_endpoint.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            games_endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::new(
            &config.rawg_base_url,
            config.rawg_key.clone(),
            config.outbound_timeout,
        )
    }

    /// `{base}/games`, optionally followed by one percent-encoded id segment
    fn games_url(&self, id: Option<&str>) -> Url {
        let mut url = self.games_endpoint.clone();
        if let Some(id) = id {
            // checked in `new`
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(id);
            }
        }
        url
    }

    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Value, CatalogError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GameCatalog for RawgCatalog {
    async fn search(&self, query: &str) -> Result<Value, CatalogError> {
        let url = self.games_url(None);
        let page_size = SEARCH_PAGE_SIZE.to_string();

        let body = self
            .get_json(url, &[("search", query), ("page_size", page_size.as_str())])
            .await
            .map_err(|e| match e {
                // a 404 on the collection endpoint is not a missing game
                CatalogError::NotFound => CatalogError::Status(404),
                other => other,
            })?;

        match body {
            Value::Object(mut map) => map
                .remove("results")
                .ok_or(CatalogError::MissingField("results")),
            _ => Err(CatalogError::MissingField("results")),
        }
    }

    async fn game(&self, id: &str) -> Result<Value, CatalogError> {
        let url = self.games_url(Some(id));
        self.get_json(url, &[]).await
    }
}
