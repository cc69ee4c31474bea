//! Snippet editor rendering.

use crate::app::App;
use crate::form::{SnippetField, SnippetForm};
use crate::ui::badge::language_color;
use crate::ui::centered_rect;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Render the create / edit dialog.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Full screen area; the dialog is centred in it
/// * `buf` - Buffer to render to
///
/// # Details
/// Fields top to bottom: title, language picker, code, description and
/// tags. The focused field has a yellow border; validation messages show
/// in red under their field's title.
pub fn render_form(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.form;
    let dialog = centered_rect(90, 90, area);
    Widget::render(Clear, dialog, buf);

    let title = if form.is_new() {
        " Create New Snippet "
    } else {
        " Edit Snippet "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(dialog);
    Widget::render(block, dialog, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Language
            Constraint::Min(5),    // Code
            Constraint::Length(4), // Description
            Constraint::Length(3), // Tags
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    render_text_field(
        form,
        SnippetField::Title,
        "Title *",
        &form.title,
        form.errors.title.as_deref(),
        chunks[0],
        buf,
    );
    render_language_picker(form, chunks[1], buf);
    render_text_field(
        form,
        SnippetField::Code,
        "Code *",
        &form.code,
        form.errors.code.as_deref(),
        chunks[2],
        buf,
    );
    render_text_field(
        form,
        SnippetField::Description,
        "Description",
        &form.description,
        None,
        chunks[3],
        buf,
    );
    render_text_field(
        form,
        SnippetField::Tags,
        "Tags (comma separated)",
        &form.tags,
        None,
        chunks[4],
        buf,
    );

    let save = if form.is_new() { "create" } else { "save" };
    let hints = Line::from(Span::styled(
        format!(
            "Tab next field | Shift+Tab previous | ←/→ language | Ctrl+S {} | Esc cancel",
            save
        ),
        Style::default().fg(Color::DarkGray),
    ));
    Widget::render(Paragraph::new(hints), chunks[5], buf);
}

fn field_block(
    form: &SnippetForm,
    field: SnippetField,
    label: &str,
    error: Option<&str>,
) -> Block<'static> {
    let focused = form.focus == field;
    let mut title = vec![Span::styled(
        format!(" {} ", label),
        if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        },
    )];
    if let Some(error) = error {
        title.push(Span::styled(
            format!("{} ", error),
            Style::default().fg(Color::Red),
        ));
    }

    let border = if error.is_some() {
        Color::Red
    } else if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_text_field(
    form: &SnippetForm,
    field: SnippetField,
    label: &str,
    value: &str,
    error: Option<&str>,
    area: Rect,
    buf: &mut Buffer,
) {
    let mut text = value.to_string();
    if form.focus == field {
        text.push('_');
    }
    let style = if field == SnippetField::Code {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    // Keep the cursor visible once the text outgrows the box.
    let height = area.height.saturating_sub(2) as usize;
    let lines = text.lines().count().max(1);
    let scroll = if form.focus == field {
        lines.saturating_sub(height) as u16
    } else {
        0
    };

    let paragraph = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(field_block(form, field, label, error));
    Widget::render(paragraph, area, buf);
}

fn render_language_picker(form: &SnippetForm, area: Rect, buf: &mut Buffer) {
    let language = &form.language;
    let line = Line::from(vec![
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", language.icon(), language.label()),
            Style::default()
                .fg(language_color(language))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).block(field_block(
        form,
        SnippetField::Language,
        "Language",
        None,
    ));
    Widget::render(paragraph, area, buf);
}
