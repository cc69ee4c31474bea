//! Snippet list widget rendering.
//!
//! Displays a scrollable list of snippet cards with selection highlighting.

use crate::app::{App, ViewMode};
use crate::snippet::{Snippet, format_relative};
use crate::ui::badge::language_badge;
use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

/// Code lines shown per card in list mode.
const PREVIEW_LINES: usize = 3;

/// Lines one card occupies, separator included.
///
/// # Details
/// Grid: title, badge and tags, separator. List adds the code preview.
pub fn card_height(view_mode: ViewMode) -> u16 {
    match view_mode {
        ViewMode::Grid => 3,
        ViewMode::List => 4 + PREVIEW_LINES as u16,
    }
}

/// Render the snippet list widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Each card shows:
/// - Line 1: title, favorite star and relative creation time
/// - Line 2: language badge and tags (three at most, then "+N")
/// - List mode only: the first lines of the code preview
///
/// The selected card is kept centered while scrolling.
pub fn render_list(app: &App, area: Rect, buf: &mut Buffer) {
    let snippets = &app.filtered_snippets;
    let title = format!(
        "Snippets ({}/{})",
        snippets.len(),
        app.store.snippets().len()
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if app.store.is_loading() && app.store.snippets().is_empty() {
        let loading = Paragraph::new("Loading snippets...")
            .block(block)
            .alignment(Alignment::Center);
        Widget::render(loading, area, buf);
        return;
    }

    if snippets.is_empty() {
        let (heading, detail) = app.empty_message();
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                heading,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(Span::styled(
                "Press 'n' to create a snippet",
                Style::default().fg(Color::Yellow),
            )),
        ];
        let empty = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);
        Widget::render(empty, area, buf);
        return;
    }

    let selected_index = app.selected_index.min(snippets.len().saturating_sub(1));

    let separator_width = area.width.saturating_sub(2).max(10) as usize;
    let separator_line = "─".repeat(separator_width);

    let available_height = area.height.saturating_sub(2);
    let visible_cards = (available_height / card_height(app.view_mode)).max(1) as usize;
    let scroll_offset = scroll_offset(selected_index, visible_cards, snippets.len());
    let end_idx = (scroll_offset + visible_cards).min(snippets.len());

    let now = Utc::now();
    let items: Vec<ListItem> = snippets
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(end_idx - scroll_offset)
        .map(|(idx, snippet)| {
            let is_selected = idx == selected_index;
            let mut lines = card_lines(snippet, app.view_mode, is_selected, now);

            let separator_style = if is_selected {
                Style::default().fg(Color::Blue)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(Span::styled(
                separator_line.clone(),
                separator_style,
            )));

            let style = if is_selected {
                Style::default()
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(lines).style(style)
        })
        .collect();

    let relative_selected = (selected_index >= scroll_offset
        && selected_index < scroll_offset + items.len())
    .then(|| selected_index - scroll_offset);

    let mut list_state = ListState::default();
    list_state.select(relative_selected);

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
    );

    StatefulWidget::render(list, area, buf, &mut list_state);
}

/// First visible card so that `selected` sits near the middle.
///
/// # Arguments
/// * `selected` - Selected index
/// * `visible` - Cards that fit on screen
/// * `total` - Number of cards
pub fn scroll_offset(selected: usize, visible: usize, total: usize) -> usize {
    let center = visible / 2;
    let offset = selected.saturating_sub(center);
    offset.min(total.saturating_sub(visible))
}

fn card_lines(
    snippet: &Snippet,
    view_mode: ViewMode,
    is_selected: bool,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let title_style = Style::default()
        .fg(if is_selected {
            Color::Yellow
        } else {
            Color::White
        })
        .add_modifier(Modifier::BOLD);

    let mut header = vec![Span::styled(snippet.title.clone(), title_style)];
    if snippet.is_favorite {
        header.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
    }
    header.push(Span::styled(
        format!("  {}", format_relative(snippet.created_at, now)),
        Style::default().fg(Color::Gray),
    ));

    let mut meta = vec![language_badge(&snippet.language)];
    let (tags, hidden) = snippet.visible_tags();
    for tag in tags {
        meta.push(Span::styled(
            format!(" #{}", tag),
            Style::default().fg(Color::Cyan),
        ));
    }
    if hidden > 0 {
        meta.push(Span::styled(
            format!(" +{}", hidden),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![Line::from(header), Line::from(meta)];

    if view_mode == ViewMode::List {
        let preview = snippet.code_preview();
        let mut code_lines: Vec<Line<'static>> = preview
            .lines()
            .take(PREVIEW_LINES)
            .map(|l| Line::from(Span::styled(format!("  {}", l), Style::default().fg(Color::Green))))
            .collect();
        code_lines.resize(PREVIEW_LINES, Line::from(""));
        lines.extend(code_lines);
        let description = snippet.description.clone().unwrap_or_default();
        lines.push(Line::from(Span::styled(
            description,
            Style::default().fg(Color::Gray),
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::test_snippet;

    #[test]
    fn test_scroll_offset_centers_selection() {
        assert_eq!(scroll_offset(0, 4, 10), 0);
        assert_eq!(scroll_offset(5, 4, 10), 3);
        // Never scrolls past the end.
        assert_eq!(scroll_offset(9, 4, 10), 6);
        // Everything fits.
        assert_eq!(scroll_offset(2, 8, 3), 0);
    }

    #[test]
    fn test_card_lines_match_card_height() {
        let now = Utc::now();
        let mut snippet = test_snippet("1", "Debounce", now);
        snippet.tags = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        snippet.code = "line 1\nline 2\nline 3\nline 4\nline 5".into();

        for mode in [ViewMode::Grid, ViewMode::List] {
            let lines = card_lines(&snippet, mode, false, now);
            assert_eq!(lines.len() as u16 + 1, card_height(mode));
        }

        let grid = card_lines(&snippet, ViewMode::Grid, false, now);
        let meta: String = grid[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(meta.contains("#c"));
        assert!(!meta.contains("#d"));
        assert!(meta.ends_with("+1"));
    }

    #[test]
    fn test_favorite_star_in_header() {
        let now = Utc::now();
        let mut snippet = test_snippet("1", "Debounce", now);
        let plain = card_lines(&snippet, ViewMode::Grid, false, now);
        assert!(!plain[0].spans.iter().any(|s| s.content.contains('★')));
        snippet.is_favorite = true;
        let starred = card_lines(&snippet, ViewMode::Grid, true, now);
        assert!(starred[0].spans.iter().any(|s| s.content.contains('★')));
    }
}
