//! Navbar widget rendering.
//!
//! Displays the application name, the signed-in account and the snippet
//! counters.

use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the navbar.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Shows "CodeVault", the user's email and the total / favorites /
/// languages counters.
pub fn render_navbar(app: &App, area: Rect, buf: &mut Buffer) {
    let stats = app.store.stats();
    let account = app
        .store
        .user()
        .map(|user| user.email.clone().unwrap_or_else(|| user.id.clone()))
        .unwrap_or_else(|| "not signed in".to_string());

    let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
    let line = Line::from(vec![
        Span::styled(
            "</> CodeVault",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        separator.clone(),
        Span::styled(account, Style::default().fg(Color::Cyan)),
        separator.clone(),
        Span::styled(
            format!("Total Snippets: {}", stats.total),
            Style::default().fg(Color::White),
        ),
        separator.clone(),
        Span::styled(
            format!("★ Favorites: {}", stats.favorites),
            Style::default().fg(Color::Yellow),
        ),
        separator,
        Span::styled(
            format!("Languages: {}", stats.languages),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line)
        .block(Block::default().title("My Snippets").borders(Borders::ALL))
        .alignment(Alignment::Center);

    Widget::render(paragraph, area, buf);
}
