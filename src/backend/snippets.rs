//! Snippet table access.

use crate::backend::{BackendError, Query, TablesClient};
use crate::snippet::{NewSnippet, Snippet, SnippetPatch};
use async_trait::async_trait;

/// Remote operations on the snippets table.
///
/// The store only talks to this trait, so it can run against an in-memory
/// table in tests.
#[async_trait]
pub trait SnippetBackend: Send + Sync {
    /// Snippets owned by `user_id`, newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<Snippet>, BackendError>;
    /// Insert a snippet and return the stored row.
    async fn create(&self, snippet: &NewSnippet) -> Result<Snippet, BackendError>;
    /// Apply `patch` to the snippet `id` and return the stored row.
    async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, BackendError>;
    /// Delete the snippet `id`.
    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}

/// Snippet table on the hosted backend, accessed with one user's token.
#[derive(Debug, Clone)]
pub struct RemoteSnippets {
    tables: TablesClient,
    table: String,
    access_token: String,
}

impl RemoteSnippets {
    pub fn new(tables: TablesClient, table: &str, access_token: &str) -> Self {
        Self {
            tables,
            table: table.to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[async_trait]
impl SnippetBackend for RemoteSnippets {
    async fn list(&self, user_id: &str) -> Result<Vec<Snippet>, BackendError> {
        let query = Query::new()
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", false);
        self.tables
            .select(&self.table, &query, &self.access_token)
            .await
    }

    async fn create(&self, snippet: &NewSnippet) -> Result<Snippet, BackendError> {
        self.tables
            .insert(&self.table, snippet, &self.access_token)
            .await
    }

    async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet, BackendError> {
        let query = Query::new().eq("id", id);
        self.tables
            .update(&self.table, &query, patch, &self.access_token)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let query = Query::new().eq("id", id);
        self.tables
            .delete(&self.table, &query, &self.access_token)
            .await
    }
}
