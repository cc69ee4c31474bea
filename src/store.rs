//! Snippet store.
//!
//! The single data-access layer of the application: mirrors the signed-in
//! user's snippets in memory, forwards list/create/update/delete to the
//! backend and reports every outcome as a toast.

use crate::backend::{BackendError, SnippetBackend, User};
use crate::snippet::{Language, Snippet, SnippetDraft, SnippetPatch};
use crate::toast::{Toast, ToastQueue};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub favorites: usize,
    pub languages: usize,
}

/// Backend bound to the user whose token it carries.
struct Connection {
    user: User,
    backend: Arc<dyn SnippetBackend>,
}

/// In-memory mirror of the remote snippets table for the current user.
pub struct SnippetStore {
    connection: Option<Connection>,
    snippets: Vec<Snippet>,
    loading: bool,
    /// Notifications produced by store operations
    pub toasts: ToastQueue,
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetStore")
            .field("user", &self.user())
            .field("snippets", &self.snippets.len())
            .field("loading", &self.loading)
            .finish()
    }
}

impl SnippetStore {
    /// Create a signed-out store.
    ///
    /// # Arguments
    /// * `toast_lifetime` - How long notifications stay visible
    pub fn new(toast_lifetime: Duration) -> Self {
        Self {
            connection: None,
            snippets: Vec::new(),
            loading: true,
            toasts: ToastQueue::new(toast_lifetime),
        }
    }

    /// Bind the store to a signed-in user.
    pub fn connect(&mut self, user: User, backend: Arc<dyn SnippetBackend>) {
        tracing::info!(user_id = %user.id, "store connected");
        self.connection = Some(Connection { user, backend });
        self.loading = true;
    }

    /// Swap the backend of the current connection, e.g. after a token
    /// refresh. The user, the list and the loading flag are untouched.
    /// Does nothing while signed out.
    pub fn rebind(&mut self, backend: Arc<dyn SnippetBackend>) {
        if let Some(conn) = self.connection.as_mut() {
            tracing::debug!(user_id = %conn.user.id, "store backend replaced");
            conn.backend = backend;
        }
    }

    /// Forget the user and their snippets.
    pub fn disconnect(&mut self) {
        self.connection = None;
        self.snippets.clear();
        self.loading = false;
    }

    pub fn user(&self) -> Option<&User> {
        self.connection.as_ref().map(|c| &c.user)
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn get(&self, id: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Reload the user's snippets, newest first.
    ///
    /// # Details
    /// Without a user the list is emptied. On failure the current list is
    /// kept and an error toast is raised. Loading is always cleared.
    pub async fn fetch(&mut self) {
        let Some(conn) = &self.connection else {
            self.snippets.clear();
            self.loading = false;
            return;
        };

        match conn.backend.list(&conn.user.id).await {
            Ok(snippets) => {
                tracing::debug!(count = snippets.len(), "snippets fetched");
                self.snippets = snippets;
            }
            Err(e) => self.fail("Error fetching snippets", &e),
        }
        self.loading = false;
    }

    /// Create a snippet owned by the current user.
    ///
    /// # Arguments
    /// * `draft` - Validated editor content
    ///
    /// # Returns
    /// * `Option<Snippet>` - Stored snippet, or None on failure or when signed out
    pub async fn create(&mut self, draft: SnippetDraft) -> Option<Snippet> {
        let conn = self.connection.as_ref()?;
        let new = draft.into_new(&conn.user.id);

        match conn.backend.create(&new).await {
            Ok(snippet) => {
                self.snippets.insert(0, snippet.clone());
                self.toasts.push(Toast::success(
                    "Snippet created",
                    "Your snippet has been saved successfully.",
                ));
                Some(snippet)
            }
            Err(e) => {
                self.fail("Error creating snippet", &e);
                None
            }
        }
    }

    /// Update a snippet and replace it in the local list.
    pub async fn update(&mut self, id: &str, patch: SnippetPatch) -> Option<Snippet> {
        let result = match &self.connection {
            Some(conn) => conn.backend.update(id, &patch).await,
            None => Err(BackendError::NotAuthenticated),
        };

        match result {
            Ok(updated) => {
                for slot in self.snippets.iter_mut().filter(|s| s.id == id) {
                    *slot = updated.clone();
                }
                self.toasts
                    .push(Toast::success("Snippet updated", "Your changes have been saved."));
                Some(updated)
            }
            Err(e) => {
                self.fail("Error updating snippet", &e);
                None
            }
        }
    }

    /// Delete a snippet and drop it from the local list.
    ///
    /// # Returns
    /// * `bool` - True when the backend deleted it
    pub async fn delete(&mut self, id: &str) -> bool {
        let result = match &self.connection {
            Some(conn) => conn.backend.delete(id).await,
            None => Err(BackendError::NotAuthenticated),
        };

        match result {
            Ok(()) => {
                self.snippets.retain(|s| s.id != id);
                self.toasts
                    .push(Toast::success("Snippet deleted", "The snippet has been removed."));
                true
            }
            Err(e) => {
                self.fail("Error deleting snippet", &e);
                false
            }
        }
    }

    /// Flip the favorite flag of one snippet.
    ///
    /// # Details
    /// Unknown ids are ignored without a backend call. Only the flag is sent.
    pub async fn toggle_favorite(&mut self, id: &str) -> Option<Snippet> {
        let current = self.get(id)?.is_favorite;
        self.update(id, SnippetPatch::favorite(!current)).await
    }

    /// Distinct tags over all snippets, sorted.
    pub fn available_tags(&self) -> Vec<String> {
        self.snippets
            .iter()
            .flat_map(|s| s.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.snippets.len(),
            favorites: self.snippets.iter().filter(|s| s.is_favorite).count(),
            languages: self
                .snippets
                .iter()
                .map(|s| &s.language)
                .collect::<HashSet<&Language>>()
                .len(),
        }
    }

    fn fail(&mut self, title: &str, error: &BackendError) {
        self.toasts.push(Toast::error(title, error));
    }
}
