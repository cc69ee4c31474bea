//! Application state management.
//!
//! Manages the snippet list view, selection, search, filters, dialogs and
//! the editor and sign-in forms.

use crate::form::{AuthForm, SnippetForm};
use crate::snippet::{Language, Snippet};
use crate::store::SnippetStore;
use serde::{Deserialize, Serialize};
use std::cmp;
use std::time::{Duration, Instant};

/// How long the "Copied" marker stays visible.
const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

/// Current screen or dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Sign-in / sign-up screen
    Auth,
    /// Normal list view
    List,
    /// Typing into the search bar
    Search,
    /// Snippet detail dialog
    View,
    /// Create / edit form
    Form,
    /// Delete confirmation dialog
    ConfirmDelete,
}

/// Sort order of the snippet list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first by creation time
    Newest,
    /// Oldest first by creation time
    Oldest,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Newest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
        }
    }
}

/// Card layout of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Compact cards
    Grid,
    /// Expanded cards with code preview
    List,
}

/// Search, language, tag and sort settings of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub query: String,
    /// None = all languages
    pub language: Option<Language>,
    /// None = all tags
    pub tag: Option<String>,
    pub sort: SortOrder,
}

impl Filters {
    pub fn new(sort: SortOrder) -> Self {
        Self {
            query: String::new(),
            language: None,
            tag: None,
            sort,
        }
    }

    /// Whether a snippet passes the search, language and tag filters.
    ///
    /// # Details
    /// The search matches the title case-insensitively. The tag filter
    /// requires an exact tag.
    pub fn matches(&self, snippet: &Snippet) -> bool {
        if !self.query.is_empty()
            && !snippet
                .title
                .to_lowercase()
                .contains(&self.query.to_lowercase())
        {
            return false;
        }
        if let Some(language) = &self.language
            && snippet.language != *language
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !snippet.has_tag(tag)
        {
            return false;
        }
        true
    }

    /// Filter and sort `snippets`.
    ///
    /// # Details
    /// Sorting is stable, so snippets created at the same instant keep
    /// their relative order.
    pub fn apply(&self, snippets: &[Snippet]) -> Vec<Snippet> {
        let mut result: Vec<Snippet> = snippets
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect();
        match self.sort {
            SortOrder::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        result
    }

    /// Whether search, language or tag narrow the list. Sort does not count.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.language.is_some() || self.tag.is_some()
    }

    /// Reset search, language and tag. Keeps the sort order.
    pub fn clear(&mut self) {
        self.query.clear();
        self.language = None;
        self.tag = None;
    }
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Data-access layer and the user's snippets
    pub store: SnippetStore,
    /// Snippets after search, filters and sorting
    pub filtered_snippets: Vec<Snippet>,
    /// Currently selected index (in filtered_snippets)
    pub selected_index: usize,
    pub filters: Filters,
    /// Current UI mode
    pub mode: UiMode,
    pub view_mode: ViewMode,
    /// Id of the snippet shown in the detail dialog
    pub viewing: Option<String>,
    /// Id of the snippet awaiting delete confirmation
    pub deleting: Option<String>,
    pub form: SnippetForm,
    pub auth_form: AuthForm,
    /// Mode to return to when the form closes
    form_return: UiMode,
    /// When code was last copied
    copied_at: Option<Instant>,
    /// Status message to display when no toast is live
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application state.
    ///
    /// # Arguments
    /// * `store` - Snippet store, connected or not
    /// * `sort` - Initial sort order
    pub fn new(store: SnippetStore, sort: SortOrder) -> Self {
        let mode = if store.user().is_some() {
            UiMode::List
        } else {
            UiMode::Auth
        };
        Self {
            store,
            filtered_snippets: Vec::new(),
            selected_index: 0,
            filters: Filters::new(sort),
            mode,
            view_mode: ViewMode::Grid,
            viewing: None,
            deleting: None,
            form: SnippetForm::new(),
            auth_form: AuthForm::default(),
            form_return: UiMode::List,
            copied_at: None,
            status_message: None,
        }
    }

    /// Recompute the visible list from the store.
    ///
    /// # Details
    /// Call after every store mutation and filter change. Keeps the
    /// selection on the same snippet when it is still visible.
    pub fn refresh(&mut self) {
        let selected_id = self.selected_snippet().map(|s| s.id.clone());
        self.filtered_snippets = self.filters.apply(self.store.snippets());

        if let Some(id) = selected_id
            && let Some(index) = self.filtered_snippets.iter().position(|s| s.id == id)
        {
            self.selected_index = index;
            return;
        }
        self.selected_index = cmp::min(
            self.selected_index,
            self.filtered_snippets.len().saturating_sub(1),
        );
    }

    /// Get the currently selected snippet.
    pub fn selected_snippet(&self) -> Option<&Snippet> {
        self.filtered_snippets.get(self.selected_index)
    }

    /// Snippet shown in the detail dialog, read from the store so favorite
    /// toggles show up immediately.
    pub fn viewing_snippet(&self) -> Option<&Snippet> {
        self.viewing.as_deref().and_then(|id| self.store.get(id))
    }

    /// Move selection up, wrapping to the bottom.
    pub fn move_up(&mut self) {
        if self.filtered_snippets.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.filtered_snippets.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn move_down(&mut self) {
        if self.filtered_snippets.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.filtered_snippets.len();
    }

    /// Add a character to the search query.
    ///
    /// # Details
    /// Only works in Search mode. Applies filters after adding character.
    pub fn add_search_char(&mut self, ch: char) {
        if self.mode == UiMode::Search {
            self.filters.query.push(ch);
            self.refresh();
        }
    }

    /// Remove last character from search query.
    pub fn remove_search_char(&mut self) {
        if self.mode == UiMode::Search {
            self.filters.query.pop();
            self.refresh();
        }
    }

    /// Cycle the language filter: all → each language → all.
    pub fn cycle_language_filter(&mut self) {
        self.filters.language = match &self.filters.language {
            None => Some(Language::ALL[0].clone()),
            Some(current) => match Language::ALL.iter().position(|l| l == current) {
                Some(i) if i + 1 < Language::ALL.len() => Some(Language::ALL[i + 1].clone()),
                _ => None,
            },
        };
        self.refresh();
    }

    /// Cycle the tag filter over the available tags: all → each tag → all.
    pub fn cycle_tag_filter(&mut self) {
        let tags = self.store.available_tags();
        self.filters.tag = match &self.filters.tag {
            None => tags.first().cloned(),
            Some(current) => match tags.iter().position(|t| t == current) {
                Some(i) => tags.get(i + 1).cloned(),
                None => tags.first().cloned(),
            },
        };
        self.refresh();
    }

    pub fn toggle_sort(&mut self) {
        self.filters.sort = self.filters.sort.toggled();
        self.refresh();
    }

    /// Whether search, language or tag currently narrow the list.
    pub fn has_filters(&self) -> bool {
        self.filters.is_active()
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refresh();
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        };
    }

    /// Title and description shown when the list is empty.
    pub fn empty_message(&self) -> (&'static str, &'static str) {
        if self.store.snippets().is_empty() {
            (
                "No snippets yet",
                "Create your first code snippet to get started.",
            )
        } else {
            ("No matching snippets", "Try adjusting your search or filters.")
        }
    }

    /// Open the detail dialog for the selected snippet.
    pub fn open_view(&mut self) {
        if let Some(snippet) = self.selected_snippet() {
            self.viewing = Some(snippet.id.clone());
            self.mode = UiMode::View;
        }
    }

    pub fn close_view(&mut self) {
        self.viewing = None;
        self.mode = UiMode::List;
    }

    /// Ask for confirmation before deleting the selected snippet.
    pub fn request_delete(&mut self) {
        if let Some(snippet) = self.selected_snippet() {
            self.deleting = Some(snippet.id.clone());
            self.mode = UiMode::ConfirmDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.deleting = None;
        self.mode = UiMode::List;
    }

    /// Open an empty editor.
    pub fn open_new_form(&mut self) {
        self.form = SnippetForm::new();
        self.form_return = self.mode;
        self.mode = UiMode::Form;
    }

    /// Open the editor for `id`. Unknown ids leave the mode unchanged.
    pub fn open_edit_form(&mut self, id: &str) {
        if let Some(snippet) = self.store.get(id) {
            self.form = SnippetForm::edit(snippet);
            self.form_return = self.mode;
            self.mode = UiMode::Form;
        }
    }

    /// Leave the editor, back to where it was opened from.
    pub fn close_form(&mut self) {
        self.mode = match self.form_return {
            UiMode::View if self.viewing_snippet().is_some() => UiMode::View,
            _ => UiMode::List,
        };
    }

    /// Id of the snippet a favorite toggle applies to in the current mode.
    pub fn favorite_target(&self) -> Option<String> {
        match self.mode {
            UiMode::View => self.viewing.clone(),
            UiMode::List => self.selected_snippet().map(|s| s.id.clone()),
            _ => None,
        }
    }

    pub fn mark_copied(&mut self) {
        self.copied_at = Some(Instant::now());
        self.status_message = None;
    }

    /// Whether the "Copied" marker should show at `now`.
    pub fn show_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPIED_FEEDBACK)
    }

    /// Status bar text at `now`: the "Copied" marker while it lasts, then
    /// the last status message.
    pub fn status_line(&self, now: Instant) -> Option<String> {
        if self.show_copied(now) {
            Some("Copied".to_string())
        } else {
            self.status_message.clone()
        }
    }

    /// Set status message.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Reset everything tied to the signed-in user.
    pub fn signed_out(&mut self) {
        self.store.disconnect();
        self.store.toasts.clear();
        self.filters.clear();
        self.viewing = None;
        self.deleting = None;
        self.auth_form = AuthForm::default();
        self.mode = UiMode::Auth;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::test_snippet;
    use crate::store::tests::{MemoryBackend, seeded_rows, user};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::sync::Arc;

    async fn app_with(rows: Vec<Snippet>) -> App {
        let mut store = SnippetStore::new(Duration::from_secs(4));
        store.connect(user(), Arc::new(MemoryBackend::with_rows(rows)));
        store.fetch().await;
        let mut app = App::new(store, SortOrder::Newest);
        app.refresh();
        app
    }

    fn ids(app: &App) -> Vec<&str> {
        app.filtered_snippets.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_app_new_signed_out_starts_on_auth() {
        let app = App::new(SnippetStore::new(Duration::from_secs(4)), SortOrder::Newest);
        assert_eq!(app.mode, UiMode::Auth);
        assert!(app.filtered_snippets.is_empty());
        assert_eq!(app.view_mode, ViewMode::Grid);
    }

    #[test]
    fn test_toggle_view_mode() {
        let mut app = App::new(SnippetStore::new(Duration::from_secs(4)), SortOrder::Newest);
        app.toggle_view_mode();
        assert_eq!(app.view_mode, ViewMode::List);
        app.toggle_view_mode();
        assert_eq!(app.view_mode, ViewMode::Grid);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title() {
        let now = Utc::now();
        let mut filters = Filters::new(SortOrder::Newest);
        filters.query = "BINARY".to_string();
        let mut hit = test_snippet("1", "binary search", now);
        hit.code = "irrelevant".into();
        let mut miss = test_snippet("2", "Quick sort", now);
        miss.description = Some("binary in description only".into());
        miss.code = "binary".into();
        assert!(filters.matches(&hit));
        assert!(!filters.matches(&miss));
    }

    #[test]
    fn test_tag_filter_requires_exact_membership() {
        let now = Utc::now();
        let mut filters = Filters::new(SortOrder::Newest);
        filters.tag = Some("sort".to_string());
        let mut exact = test_snippet("1", "A", now);
        exact.tags = vec!["sort".into()];
        let mut partial = test_snippet("2", "B", now);
        partial.tags = vec!["sorting".into(), "Sort".into()];
        assert!(filters.matches(&exact));
        assert!(!filters.matches(&partial));
    }

    #[test]
    fn test_language_filter() {
        let now = Utc::now();
        let mut filters = Filters::new(SortOrder::Newest);
        filters.language = Some(Language::Python);
        let mut py = test_snippet("1", "A", now);
        py.language = Language::Python;
        let js = test_snippet("2", "B", now);
        assert!(filters.matches(&py));
        assert!(!filters.matches(&js));
    }

    #[test]
    fn test_sort_newest_and_oldest() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // Reversed input for newest-first: oldest listed first.
        let rows = vec![
            test_snippet("old", "A", base),
            test_snippet("mid", "B", base + ChronoDuration::days(1)),
            test_snippet("new", "C", base + ChronoDuration::days(2)),
        ];
        let newest = Filters::new(SortOrder::Newest).apply(&rows);
        let order: Vec<&str> = newest.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);

        let reversed: Vec<Snippet> = rows.iter().rev().cloned().collect();
        let oldest = Filters::new(SortOrder::Oldest).apply(&reversed);
        let order: Vec<&str> = oldest.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![
            test_snippet("first", "A", at),
            test_snippet("later", "B", at + ChronoDuration::seconds(1)),
            test_snippet("second", "C", at),
        ];
        let newest = Filters::new(SortOrder::Newest).apply(&rows);
        let order: Vec<&str> = newest.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["later", "first", "second"]);

        let oldest = Filters::new(SortOrder::Oldest).apply(&rows);
        let order: Vec<&str> = oldest.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "later"]);
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut filters = Filters::new(SortOrder::Oldest);
        filters.query = "x".into();
        filters.tag = Some("t".into());
        filters.language = Some(Language::C);
        assert!(filters.is_active());
        filters.clear();
        assert!(!filters.is_active());
        assert_eq!(filters.sort, SortOrder::Oldest);
    }

    #[tokio::test]
    async fn test_app_filters_and_selection() {
        let mut app = app_with(seeded_rows()).await;
        assert_eq!(app.mode, UiMode::List);
        assert_eq!(ids(&app), vec!["c", "b", "a"]);

        app.move_up();
        assert_eq!(app.selected_index, 2);
        app.move_down();
        assert_eq!(app.selected_index, 0);

        app.mode = UiMode::Search;
        app.add_search_char('S');
        assert_eq!(ids(&app), vec!["a"]);
        app.remove_search_char();
        assert_eq!(ids(&app).len(), 3);

        app.cycle_tag_filter();
        assert_eq!(app.filters.tag.as_deref(), Some("algorithm"));
        assert_eq!(ids(&app), vec!["c", "a"]);
        app.toggle_sort();
        assert_eq!(ids(&app), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_cycle_filters_return_to_all() {
        let mut app = app_with(seeded_rows()).await;
        for _ in 0..4 {
            app.cycle_tag_filter();
        }
        assert_eq!(app.filters.tag.as_deref(), Some("timing"));
        app.cycle_tag_filter();
        assert_eq!(app.filters.tag, None);

        for _ in 0..Language::ALL.len() {
            app.cycle_language_filter();
        }
        assert_eq!(app.filters.language, Some(Language::Sql));
        app.cycle_language_filter();
        assert_eq!(app.filters.language, None);
    }

    #[tokio::test]
    async fn test_selection_follows_snippet_after_refresh() {
        let mut app = app_with(seeded_rows()).await;
        app.selected_index = 1; // "b"
        app.toggle_sort();
        assert_eq!(app.selected_snippet().unwrap().id, "b");
        app.selected_index = 2; // "c" in oldest order
        app.cycle_language_filter(); // javascript only → "c"
        assert_eq!(app.selected_snippet().unwrap().id, "c");
        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test]
    async fn test_empty_messages() {
        let app = app_with(Vec::new()).await;
        assert_eq!(app.empty_message().0, "No snippets yet");

        let mut app2 = app_with(seeded_rows()).await;
        app2.filters.query = "zzz".into();
        app2.refresh();
        assert!(app2.filtered_snippets.is_empty());
        assert_eq!(app2.empty_message().0, "No matching snippets");
        assert!(app2.has_filters());
        app2.clear_filters();
        assert!(!app2.has_filters());
        assert_eq!(app2.filtered_snippets.len(), 3);
    }

    #[tokio::test]
    async fn test_view_delete_and_form_modes() {
        let mut app = app_with(seeded_rows()).await;
        app.open_view();
        assert_eq!(app.mode, UiMode::View);
        assert_eq!(app.viewing_snippet().unwrap().id, "c");
        assert_eq!(app.favorite_target().as_deref(), Some("c"));

        app.open_edit_form("c");
        assert_eq!(app.mode, UiMode::Form);
        assert_eq!(app.form.editing.as_deref(), Some("c"));
        app.close_form();
        assert_eq!(app.mode, UiMode::View);
        app.close_view();

        app.request_delete();
        assert_eq!(app.mode, UiMode::ConfirmDelete);
        assert_eq!(app.deleting.as_deref(), Some("c"));
        app.cancel_delete();
        assert_eq!(app.mode, UiMode::List);
        assert!(app.deleting.is_none());

        app.open_new_form();
        assert!(app.form.is_new());
        app.close_form();
        assert_eq!(app.mode, UiMode::List);
    }

    #[tokio::test]
    async fn test_favorite_toggle_reflected_in_list() {
        let mut app = app_with(seeded_rows()).await;
        let target = app.favorite_target().unwrap();
        app.store.toggle_favorite(&target).await;
        app.refresh();
        assert!(app.selected_snippet().unwrap().is_favorite);
        assert_eq!(
            app.filtered_snippets.iter().filter(|s| s.is_favorite).count(),
            2
        );
    }

    #[test]
    fn test_copied_feedback_expires() {
        let mut app = App::new(SnippetStore::new(Duration::from_secs(4)), SortOrder::Newest);
        assert!(!app.show_copied(Instant::now()));
        app.mark_copied();
        assert!(app.show_copied(Instant::now()));
        assert!(!app.show_copied(Instant::now() + Duration::from_secs(3)));
    }

    #[test]
    fn test_copied_status_line_clears() {
        let mut app = App::new(SnippetStore::new(Duration::from_secs(4)), SortOrder::Newest);
        app.set_status("Exported to a.rs".to_string());
        app.mark_copied();
        let now = Instant::now();
        assert_eq!(app.status_line(now).as_deref(), Some("Copied"));
        assert_eq!(app.status_line(now + Duration::from_secs(3)), None);

        app.set_status("Exported to b.rs".to_string());
        assert_eq!(
            app.status_line(now + Duration::from_secs(3)).as_deref(),
            Some("Exported to b.rs")
        );
    }

    #[tokio::test]
    async fn test_signed_out_resets() {
        let mut app = app_with(seeded_rows()).await;
        app.filters.query = "x".into();
        app.signed_out();
        assert_eq!(app.mode, UiMode::Auth);
        assert!(app.filtered_snippets.is_empty());
        assert!(!app.filters.is_active());
    }
}
