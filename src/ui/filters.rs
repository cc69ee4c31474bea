//! Filters widget rendering.
//!
//! Displays the language, tag and sort selectors.

use crate::app::{App, ViewMode};
use crate::ui::badge::language_color;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the filters widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// First line: language, tag, sort and layout. Second line: the clear
/// hint when a filter is active, otherwise the key help.
pub fn render_filters(app: &App, area: Rect, buf: &mut Buffer) {
    let label = Style::default().fg(Color::Cyan);

    let language = match &app.filters.language {
        Some(lang) => Span::styled(
            lang.label().to_string(),
            Style::default()
                .fg(language_color(lang))
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("All languages", Style::default().fg(Color::White)),
    };
    let tag = Span::styled(
        app.filters
            .tag
            .clone()
            .unwrap_or_else(|| "All tags".to_string()),
        Style::default().fg(Color::White),
    );
    let layout = match app.view_mode {
        ViewMode::Grid => "Grid",
        ViewMode::List => "List",
    };

    let selectors = Line::from(vec![
        Span::styled("Language [l]: ", label),
        language,
        Span::raw("   "),
        Span::styled("Tag [t]: ", label),
        tag,
        Span::raw("   "),
        Span::styled("Sort [s]: ", label),
        Span::styled(app.filters.sort.name(), Style::default().fg(Color::Magenta)),
        Span::raw("   "),
        Span::styled("View [v]: ", label),
        Span::styled(layout, Style::default().fg(Color::White)),
    ]);

    let hint = if app.has_filters() {
        Line::from(vec![
            Span::styled("Active filters: ", Style::default().fg(Color::Gray)),
            Span::styled("press 'C' to clear all", Style::default().fg(Color::Yellow)),
        ])
    } else {
        Line::from(Span::styled(
            "n new | Enter view | e edit | f favorite | c copy | x export | d delete | r reload | o sign out",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let paragraph = Paragraph::new(vec![selectors, hint])
        .block(Block::default().title("Filters").borders(Borders::ALL));

    Widget::render(paragraph, area, buf);
}
