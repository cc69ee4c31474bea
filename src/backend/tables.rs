//! Hosted tables API client.
//!
//! Thin wrapper over the backend's REST tables endpoint: select with
//! equality filters and ordering, insert, update and delete by filter.

use crate::backend::error::BackendError;
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Filter and ordering for a table request.
///
/// Renders to the query parameters understood by the tables endpoint,
/// e.g. `select=*&user_id=eq.42&order=created_at.desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict returned columns. Defaults to `*`.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    /// Keep rows whose `column` equals `value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Order rows by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    /// Query parameters for a read.
    pub fn read_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        params.extend(self.filter_params());
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        params
    }

    /// Query parameters for a write; only the filters apply.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }
}

/// Client for the backend's tables endpoint.
#[derive(Debug, Clone)]
pub struct TablesClient {
    /// HTTP client for API requests
    client: Client,
    /// `<backend_url>/rest/v1`
    base_url: String,
    /// Project key sent with every request
    anon_key: String,
}

impl TablesClient {
    /// Create a new tables client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Result<TablesClient>` - New client or error
    ///
    /// # Details
    /// Requires the backend URL and the project's anon key.
    pub fn new(config: &Config) -> Result<Self> {
        if config.backend_url.is_empty() || config.anon_key.is_empty() {
            return Err(anyhow::anyhow!(
                "Backend URL and anon key are required. Please set them in config.jsonc"
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.backend_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    /// Select rows from `table`.
    ///
    /// # Arguments
    /// * `table` - Table name
    /// * `query` - Filters and ordering
    /// * `access_token` - Session token of the signed-in user
    ///
    /// # Returns
    /// * `Result<Vec<T>, BackendError>` - Matching rows or error
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        access_token: &str,
    ) -> Result<Vec<T>, BackendError> {
        tracing::debug!(table, params = ?query.read_params(), "select");
        let response = self
            .authorized(self.client.get(self.table_url(table)), access_token)
            .query(&query.read_params())
            .send()
            .await?;

        decode(checked(response).await?).await
    }

    /// Insert one row and return it as stored.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
        access_token: &str,
    ) -> Result<T, BackendError> {
        tracing::debug!(table, "insert");
        let response = self
            .authorized(self.client.post(self.table_url(table)), access_token)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        single(decode(checked(response).await?).await?)
    }

    /// Update the rows matching `query` and return the single updated row.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
        access_token: &str,
    ) -> Result<T, BackendError> {
        tracing::debug!(table, params = ?query.filter_params(), "update");
        let response = self
            .authorized(self.client.patch(self.table_url(table)), access_token)
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(patch)
            .send()
            .await?;

        single(decode(checked(response).await?).await?)
    }

    /// Delete the rows matching `query`.
    pub async fn delete(
        &self,
        table: &str,
        query: &Query,
        access_token: &str,
    ) -> Result<(), BackendError> {
        tracing::debug!(table, params = ?query.filter_params(), "delete");
        let response = self
            .authorized(self.client.delete(self.table_url(table)), access_token)
            .query(&query.filter_params())
            .send()
            .await?;

        checked(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into `BackendError::Api`.
pub(crate) async fn checked(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, body = %body, "backend request failed");
    Err(BackendError::from_response(status, &body))
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Expect exactly one row from a `return=representation` write.
fn single<T>(rows: Vec<T>) -> Result<T, BackendError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        _ => Err(BackendError::Decode(format!(
            "expected a single row, got {}",
            count
        ))),
    }
}
