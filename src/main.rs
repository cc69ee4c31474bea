//! CodeVault - Terminal User Interface for a personal code snippet vault.
//!
//! Main entry point and event loop for the application.

mod app;
mod backend;
mod browser;
mod config;
mod export;
mod form;
mod session;
mod snippet;
mod store;
mod toast;
mod ui;

use anyhow::Context as _;
use app::{App, UiMode};
use backend::{AuthClient, RemoteSnippets, Session, SignUpOutcome, TablesClient, oauth};
use chrono::Utc;
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use form::{AuthMode, SnippetField};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use session::SessionFile;
use snippet::SnippetPatch;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use store::SnippetStore;
use toast::Toast;
use tracing_subscriber::EnvFilter;

/// Backend clients and the signed-in session.
struct Context {
    config: Config,
    auth: AuthClient,
    tables: TablesClient,
    session_file: SessionFile,
    session: Option<Session>,
}

impl Context {
    fn remote(&self, session: &Session) -> Arc<RemoteSnippets> {
        Arc::new(RemoteSnippets::new(
            self.tables.clone(),
            &self.config.snippets_table,
            &session.access_token,
        ))
    }

    /// Point the store at `session`'s user and remember the session.
    fn connect(&mut self, store: &mut SnippetStore, session: Session) {
        store.connect(session.user.clone(), self.remote(&session));
        self.session = Some(session);
    }

    /// Persist a fresh session, connect and load the user's snippets.
    async fn signed_in(&mut self, app: &mut App, session: Session) {
        if let Err(e) = self.session_file.save(&session) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        tracing::info!(user_id = %session.user.id, "signed in");
        self.connect(&mut app.store, session);
        app.auth_form.clear_password();
        app.mode = UiMode::List;
        app.store.fetch().await;
        app.refresh();
    }

    /// Refresh the access token when it has expired.
    ///
    /// # Details
    /// A failed refresh leaves the session as is; the next table call
    /// reports the error through the store.
    async fn ensure_fresh(&mut self, app: &mut App) {
        let refresh_token = match &self.session {
            Some(session) if session.is_expired(Utc::now()) => session.refresh_token.clone(),
            _ => return,
        };
        match self.auth.refresh(&refresh_token).await {
            Ok(session) => {
                if let Err(e) = self.session_file.save(&session) {
                    tracing::warn!(error = %e, "failed to persist session");
                }
                app.store.rebind(self.remote(&session));
                self.session = Some(session);
            }
            Err(e) => tracing::warn!(error = %e, "token refresh failed"),
        }
    }

    async fn sign_out(&mut self, app: &mut App) {
        if let Some(session) = self.session.take()
            && let Err(e) = self.auth.sign_out(&session.access_token).await
        {
            tracing::warn!(error = %e, "remote sign out failed");
        }
        if let Err(e) = self.session_file.clear() {
            tracing::warn!(error = %e, "failed to remove session file");
        }
        tracing::info!("signed out");
        app.signed_out();
    }
}

/// Main application entry point.
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Loads configuration, starts logging, restores the saved session and
/// runs the event loop.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load(None)?;

    if !config.has_backend() {
        let config_path = Config::default_config_path()?;
        eprintln!("Error: backend URL and anon key are required.");
        if config_path.exists() {
            eprintln!("Please fill them in at: {}", config_path.display());
        } else {
            config.save(None)?;
            eprintln!("A config template was written to: {}", config_path.display());
        }
        eprintln!("See config.jsonc.example for the available settings.");
        return Err(anyhow::anyhow!("Backend not configured"));
    }

    init_logging(&config)?;
    tracing::info!(backend = %config.backend_url, "starting");

    let mut ctx = Context {
        auth: AuthClient::new(&config)?,
        tables: TablesClient::new(&config)?,
        session_file: SessionFile::new(config.session_file_path()?),
        session: None,
        config,
    };
    tracing::debug!(path = %ctx.session_file.path().display(), "session file");

    let mut store = SnippetStore::new(Duration::from_secs(ctx.config.toast_seconds));
    if let Some(session) = ctx.auth.current_session(&ctx.session_file).await {
        ctx.connect(&mut store, session);
        store.fetch().await;
    }

    let mut app = App::new(store, ctx.config.default_sort);
    app.refresh();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app, &mut ctx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

/// Send tracing output to the log file.
///
/// # Details
/// The terminal belongs to the UI, so nothing is written to stdout.
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let path = config.log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// Split the screen into navbar, search, filters, list and status bar.
fn layout(area: Rect) -> [Rect; 5] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Navbar
            Constraint::Length(3), // Search bar
            Constraint::Length(4), // Filters
            Constraint::Min(0),    // Snippet list
            Constraint::Length(3), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
}

/// Render the complete UI.
///
/// # Arguments
/// * `f` - Frame to render to
/// * `app` - Application state
///
/// # Details
/// The auth screen replaces the dashboard while signed out. Dialogs are
/// drawn over the dashboard.
fn render_ui(f: &mut ratatui::Frame, app: &App) {
    let area = f.area();
    let [navbar, search, filters, list, status] = layout(area);

    if app.mode == UiMode::Auth {
        let body = Rect {
            height: area.height.saturating_sub(status.height),
            ..area
        };
        ui::render_auth(app, body, f.buffer_mut());
    } else {
        ui::render_navbar(app, navbar, f.buffer_mut());
        ui::render_search(app, search, f.buffer_mut());
        ui::render_filters(app, filters, f.buffer_mut());
        ui::render_list(app, list, f.buffer_mut());

        match app.mode {
            UiMode::View => ui::render_snippet_modal(app, area, f.buffer_mut()),
            UiMode::Form => ui::render_form(app, area, f.buffer_mut()),
            UiMode::ConfirmDelete => ui::render_confirm_delete(app, area, f.buffer_mut()),
            _ => {}
        }
    }

    // Render status bar: live toast, then status message, then key hints
    let (text, color) = match app.store.toasts.latest() {
        Some(toast) if toast.is_error() => (toast.line(), Color::Red),
        Some(toast) => (toast.line(), Color::Green),
        None => (
            app.status_line(Instant::now())
                .unwrap_or_else(|| default_hint(app.mode).to_string()),
            Color::Reset,
        ),
    };
    let status_bar = Paragraph::new(Line::from(text))
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status_bar, status);
}

fn default_hint(mode: UiMode) -> &'static str {
    match mode {
        UiMode::Auth => "Enter to submit, Ctrl+R to switch sign in / sign up, Esc to quit",
        UiMode::Search => "Type to search titles, Enter or Esc to finish",
        UiMode::View => "Esc to close",
        UiMode::Form => "Ctrl+S to save, Esc to cancel",
        UiMode::ConfirmDelete => "y to delete, n to cancel",
        UiMode::List => {
            "Press 'q' to quit, '/' to search, 'n' for a new snippet, 'l'/'t'/'s' to filter and sort"
        }
    }
}

/// Main event loop.
///
/// # Arguments
/// * `terminal` - Terminal instance
/// * `app` - Application state
/// * `ctx` - Backend clients and session
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Handles keyboard and mouse events, updates state, and renders UI.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ctx: &mut Context,
) -> anyhow::Result<()> {
    // Snippet list area, updated on each render for mouse hit-testing
    let mut list_area = Rect::default();

    loop {
        app.store.toasts.expire(Instant::now());

        terminal.draw(|f| {
            list_area = layout(f.area())[3];
            render_ui(f, app);
        })?;

        // Non-blocking poll keeps toasts and the copied marker ticking
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }

                let quit = match app.mode {
                    UiMode::Auth => handle_auth_key(key, app, ctx).await,
                    UiMode::List => handle_list_key(key, app, ctx).await,
                    UiMode::Search => {
                        handle_search_key(key, app);
                        false
                    }
                    UiMode::View => {
                        handle_view_key(key, app, ctx).await;
                        false
                    }
                    UiMode::Form => {
                        handle_form_key(key, app, ctx).await;
                        false
                    }
                    UiMode::ConfirmDelete => {
                        handle_confirm_key(key, app, ctx).await;
                        false
                    }
                };
                if quit {
                    break;
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(mouse, app, list_area),
            _ => {}
        }
    }

    Ok(())
}

/// Keys on the sign-in screen. Returns true to quit.
async fn handle_auth_key(key: KeyEvent, app: &mut App, ctx: &mut Context) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('r') if ctrl => app.auth_form.toggle_mode(),
        KeyCode::Char('g') if ctrl => {
            tracing::info!(provider = %ctx.config.oauth_provider, "waiting for browser sign-in");
            let result = oauth::sign_in_with_provider(
                &ctx.auth,
                &ctx.config.oauth_provider,
                &ctx.config.oauth_redirect_addr,
            )
            .await;
            match result {
                Ok(session) => ctx.signed_in(app, session).await,
                Err(e) => app.store.toasts.push(Toast::error("Error", e)),
            }
        }
        KeyCode::Tab | KeyCode::Down => app.auth_form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.auth_form.focus_previous(),
        KeyCode::Enter => submit_auth(app, ctx).await,
        KeyCode::Backspace => app.auth_form.backspace(),
        KeyCode::Char(c) if !ctrl => app.auth_form.insert_char(c),
        _ => {}
    }
    false
}

/// Validate the auth form and sign in or sign up.
async fn submit_auth(app: &mut App, ctx: &mut Context) {
    let credentials = match app.auth_form.submit() {
        Ok(credentials) => credentials,
        Err(message) => {
            app.store
                .toasts
                .push(Toast::error("Validation Error", message));
            return;
        }
    };

    match app.auth_form.mode {
        AuthMode::SignIn => {
            match ctx
                .auth
                .sign_in(&credentials.email, &credentials.password)
                .await
            {
                Ok(session) => ctx.signed_in(app, session).await,
                Err(e) => app
                    .store
                    .toasts
                    .push(Toast::error("Authentication Error", e)),
            }
        }
        AuthMode::SignUp => {
            let outcome = ctx
                .auth
                .sign_up(
                    &credentials.email,
                    &credentials.password,
                    credentials.full_name.as_deref(),
                )
                .await;
            match outcome {
                Ok(outcome) => {
                    let toast = Toast::success("Account created!", "You can now sign in.");
                    match outcome {
                        SignUpOutcome::SignedIn(session) => ctx.signed_in(app, session).await,
                        SignUpOutcome::Created => {
                            app.auth_form.toggle_mode();
                            app.auth_form.clear_password();
                        }
                    }
                    app.store.toasts.push(toast);
                }
                Err(e) => app
                    .store
                    .toasts
                    .push(Toast::error("Authentication Error", e)),
            }
        }
    }
}

/// Keys on the dashboard. Returns true to quit.
async fn handle_list_key(key: KeyEvent, app: &mut App, ctx: &mut Context) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Enter => app.open_view(),
        KeyCode::Char('/') => app.mode = UiMode::Search,
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('e') => {
            if let Some(id) = app.selected_snippet().map(|s| s.id.clone()) {
                app.open_edit_form(&id);
            }
        }
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('f') => toggle_favorite(app, ctx).await,
        KeyCode::Char('c') => {
            let id = app.selected_snippet().map(|s| s.id.clone());
            copy_code(app, id);
        }
        KeyCode::Char('x') => {
            let id = app.selected_snippet().map(|s| s.id.clone());
            export_code(app, ctx, id);
        }
        KeyCode::Char('l') => app.cycle_language_filter(),
        KeyCode::Char('t') => app.cycle_tag_filter(),
        KeyCode::Char('s') => {
            app.toggle_sort();
            app.set_status(format!("Sort: {}", app.filters.sort.name()));
        }
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('C') => {
            app.clear_filters();
            app.set_status("Filters cleared".to_string());
        }
        KeyCode::Char('r') => {
            ctx.ensure_fresh(app).await;
            app.store.fetch().await;
            app.refresh();
            app.set_status(format!("Loaded {} snippets", app.store.snippets().len()));
        }
        KeyCode::Char('o') => ctx.sign_out(app).await,
        _ => {}
    }
    false
}

fn handle_search_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.mode = UiMode::List,
        KeyCode::Backspace => app.remove_search_char(),
        KeyCode::Char(c) => app.add_search_char(c),
        _ => {}
    }
}

/// Keys in the snippet detail dialog.
async fn handle_view_key(key: KeyEvent, app: &mut App, ctx: &mut Context) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_view(),
        KeyCode::Char('f') => toggle_favorite(app, ctx).await,
        KeyCode::Char('c') => {
            let id = app.viewing.clone();
            copy_code(app, id);
        }
        KeyCode::Char('x') => {
            let id = app.viewing.clone();
            export_code(app, ctx, id);
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.viewing.clone() {
                app.open_edit_form(&id);
            }
        }
        _ => {}
    }
}

/// Keys in the editor.
///
/// # Details
/// Enter inserts a line break in code and description and moves to the
/// next field elsewhere. Left/Right cycle the language when it has focus.
async fn handle_form_key(key: KeyEvent, app: &mut App, ctx: &mut Context) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let focus = app.form.focus;
    match key.code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Char('s') if ctrl => save_form(app, ctx).await,
        KeyCode::Tab => app.form.focus_next(),
        KeyCode::BackTab => app.form.focus_previous(),
        KeyCode::Enter if focus.is_multiline() => app.form.newline(),
        KeyCode::Enter => app.form.focus_next(),
        KeyCode::Left if focus == SnippetField::Language => app.form.previous_language(),
        KeyCode::Right if focus == SnippetField::Language => app.form.next_language(),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Char(c) if !ctrl => app.form.insert_char(c),
        _ => {}
    }
}

/// Validate the editor and create or update the snippet.
///
/// # Details
/// The editor stays open with inline errors when validation fails, and
/// with the typed content when the backend call fails.
async fn save_form(app: &mut App, ctx: &mut Context) {
    let Ok(draft) = app.form.submit() else {
        return;
    };
    ctx.ensure_fresh(app).await;

    let saved = match app.form.editing.clone() {
        None => app.store.create(draft).await,
        Some(id) => app.store.update(&id, SnippetPatch::from(draft)).await,
    };
    if saved.is_some() {
        app.refresh();
        app.close_form();
    }
}

/// Keys in the delete confirmation dialog.
async fn handle_confirm_key(key: KeyEvent, app: &mut App, ctx: &mut Context) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(id) = app.deleting.take() {
                ctx.ensure_fresh(app).await;
                app.store.delete(&id).await;
            }
            app.cancel_delete();
            app.refresh();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

async fn toggle_favorite(app: &mut App, ctx: &mut Context) {
    if let Some(id) = app.favorite_target() {
        ctx.ensure_fresh(app).await;
        app.store.toggle_favorite(&id).await;
        app.refresh();
    }
}

/// Copy the code of snippet `id` and start the copied marker.
fn copy_code(app: &mut App, id: Option<String>) {
    let Some(snippet) = id.as_deref().and_then(|id| app.store.get(id)) else {
        return;
    };
    match export::copy_to_clipboard(snippet) {
        Ok(()) => app.mark_copied(),
        Err(e) => app.store.toasts.push(Toast::error("Error", format!("{:#}", e))),
    }
}

/// Export the code of snippet `id` to the configured directory.
fn export_code(app: &mut App, ctx: &Context, id: Option<String>) {
    let Some(snippet) = id.as_deref().and_then(|id| app.store.get(id)) else {
        return;
    };
    match export::export_to_file(snippet, &ctx.config.export_dir_path()) {
        Ok(path) => app.set_status(format!("Exported to {}", path.display())),
        Err(e) => app.store.toasts.push(Toast::error("Error", format!("{:#}", e))),
    }
}

/// Handle mouse events (scroll and click).
///
/// # Arguments
/// * `mouse` - Mouse event
/// * `app` - Application state
/// * `list_area` - Area of the snippet list widget
///
/// # Details
/// Scrolling moves the selection; a left click on a card opens it.
fn handle_mouse_event(mouse: MouseEvent, app: &mut App, list_area: Rect) {
    if app.mode != UiMode::List {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_up(),
        MouseEventKind::ScrollDown => app.move_down(),
        MouseEventKind::Down(MouseButton::Left) => {
            // Inside the list, below the top border
            if mouse.column >= list_area.x
                && mouse.column < list_area.x + list_area.width
                && mouse.row > list_area.y
                && mouse.row < list_area.y + list_area.height.saturating_sub(1)
            {
                let card_height = ui::list::card_height(app.view_mode);
                let visible = (list_area.height.saturating_sub(2) / card_height).max(1) as usize;
                let offset = ui::list::scroll_offset(
                    app.selected_index,
                    visible,
                    app.filtered_snippets.len(),
                );
                let click_y = mouse.row - list_area.y - 1;
                let index = offset + (click_y / card_height) as usize;

                if index < app.filtered_snippets.len() {
                    app.selected_index = index;
                    app.open_view();
                }
            }
        }
        _ => {}
    }
}
