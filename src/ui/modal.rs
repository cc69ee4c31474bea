//! Snippet detail and delete confirmation dialogs.

use crate::app::App;
use crate::snippet::Snippet;
use crate::ui::badge::language_badge;
use crate::ui::{centered_fixed, centered_rect};
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::time::Instant;

/// Render the snippet detail dialog.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Full screen area; the dialog is centred in it
/// * `buf` - Buffer to render to
///
/// # Details
/// Shows the header (title, star, language, dates, tags), the full code
/// and the action hints. Renders nothing when the viewed snippet is gone.
pub fn render_snippet_modal(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(snippet) = app.viewing_snippet() else {
        return;
    };

    let dialog = centered_rect(85, 85, area);
    Widget::render(Clear, dialog, buf);

    let block = Block::default()
        .title(" Snippet ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(dialog);
    Widget::render(block, dialog, buf);

    let header = header_lines(snippet);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    Widget::render(
        Paragraph::new(header).wrap(Wrap { trim: false }),
        chunks[0],
        buf,
    );

    let copied = app.show_copied(Instant::now());
    let code_title = if copied { " Code (Copied!) " } else { " Code " };
    let code = Paragraph::new(snippet.code.as_str())
        .style(Style::default().fg(Color::Green))
        .block(
            Block::default()
                .title(code_title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if copied {
                    Color::Green
                } else {
                    Color::DarkGray
                })),
        );
    Widget::render(code, chunks[1], buf);

    let favorite_hint = if snippet.is_favorite {
        "f unfavorite"
    } else {
        "f favorite"
    };
    let hints = Line::from(Span::styled(
        format!("{} | c copy | x export | e edit | Esc close", favorite_hint),
        Style::default().fg(Color::DarkGray),
    ));
    Widget::render(Paragraph::new(hints), chunks[2], buf);
}

/// Header lines of the detail dialog.
fn header_lines(snippet: &Snippet) -> Vec<Line<'static>> {
    let mut title = vec![Span::styled(
        snippet.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if snippet.is_favorite {
        title.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
    }

    let mut dates = vec![
        language_badge(&snippet.language),
        Span::styled(
            format!(
                "  Created {}",
                snippet.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            Style::default().fg(Color::Gray),
        ),
    ];
    if snippet.was_edited() {
        dates.push(Span::styled(
            format!(
                "  Updated {}",
                snippet.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            Style::default().fg(Color::Gray),
        ));
    }

    let mut lines = vec![Line::from(title), Line::from(dates)];
    if let Some(description) = snippet.description.as_deref()
        && !description.is_empty()
    {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    if !snippet.tags.is_empty() {
        let tags: Vec<Span<'static>> = snippet
            .tags
            .iter()
            .map(|t| Span::styled(format!("#{} ", t), Style::default().fg(Color::Cyan)))
            .collect();
        lines.push(Line::from(tags));
    }
    lines
}

/// Render the delete confirmation dialog.
///
/// # Details
/// Names the snippet awaiting deletion; `y` confirms and `n` cancels.
pub fn render_confirm_delete(app: &App, area: Rect, buf: &mut Buffer) {
    let title = app
        .deleting
        .as_deref()
        .and_then(|id| app.store.get(id))
        .map(|s| s.title.clone())
        .unwrap_or_default();

    let dialog = centered_fixed(50, 8, area);
    Widget::render(Clear, dialog, buf);

    let lines = vec![
        Line::from(Span::styled(
            "Delete snippet?",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(title, Style::default().fg(Color::White))),
        Line::from("This action cannot be undone."),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Delete", Style::default().fg(Color::Red)),
            Span::raw("   "),
            Span::styled("[n] Cancel", Style::default().fg(Color::Gray)),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    Widget::render(paragraph, dialog, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::test_snippet;
    use chrono::{Duration, Utc};

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_header_shows_updated_only_when_edited() {
        let created = Utc::now();
        let mut snippet = test_snippet("1", "Debounce", created);
        assert!(!text(&header_lines(&snippet)).contains("Updated"));

        snippet.updated_at = created + Duration::minutes(5);
        assert!(text(&header_lines(&snippet)).contains("Updated"));
    }

    #[test]
    fn test_header_optional_sections() {
        let mut snippet = test_snippet("1", "Debounce", Utc::now());
        assert_eq!(header_lines(&snippet).len(), 2);

        snippet.description = Some("Delays calls".into());
        snippet.tags = vec!["timing".into()];
        let header = header_lines(&snippet);
        assert_eq!(header.len(), 4);
        assert!(text(&header).contains("#timing"));
    }
}
