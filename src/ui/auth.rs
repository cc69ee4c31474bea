//! Sign-in and sign-up screen rendering.

use crate::app::App;
use crate::form::{AuthField, AuthForm, AuthMode};
use crate::ui::centered_fixed;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the authentication screen.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Sign-up adds the optional full name field. The password is masked.
pub fn render_auth(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.auth_form;
    let fields = form.fields();

    let height = 5 + 3 * fields.len() as u16 + 4;
    let dialog = centered_fixed(60, height, area);

    let (heading, subheading) = match form.mode {
        AuthMode::SignIn => ("Welcome back", "Sign in to your snippet vault"),
        AuthMode::SignUp => ("Create account", "Start saving your snippets"),
    };
    let block = Block::default()
        .title(" </> CodeVault ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(dialog);
    Widget::render(block, dialog, buf);

    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            heading,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subheading, Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center);
    Widget::render(header, chunks[0], buf);

    for (field, chunk) in fields.iter().zip(chunks.iter().skip(1)) {
        render_field(form, *field, *chunk, buf);
    }

    let (submit, toggle) = match form.mode {
        AuthMode::SignIn => ("Enter sign in", "Ctrl+R create an account"),
        AuthMode::SignUp => ("Enter sign up", "Ctrl+R back to sign in"),
    };
    let hints = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} | Tab next field | {}", submit, toggle),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Ctrl+G continue with provider | Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    if let Some(area) = chunks.last() {
        Widget::render(hints, *area, buf);
    }
}

/// Text shown for a field; the password is masked.
fn display_value(form: &AuthForm, field: AuthField) -> String {
    match field {
        AuthField::FullName => form.full_name.clone(),
        AuthField::Email => form.email.clone(),
        AuthField::Password => "•".repeat(form.password.chars().count()),
    }
}

fn render_field(form: &AuthForm, field: AuthField, area: Rect, buf: &mut Buffer) {
    let focused = form.focus == field;
    let label = match field {
        AuthField::FullName => " Full name (optional) ",
        AuthField::Email => " Email ",
        AuthField::Password => " Password ",
    };
    let mut value = display_value(form, field);
    if focused {
        value.push('_');
    }

    let paragraph = Paragraph::new(value).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Yellow
            } else {
                Color::DarkGray
            })),
    );
    Widget::render(paragraph, area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_masked() {
        let mut form = AuthForm::default();
        form.email = "dev@example.com".into();
        form.password = "hunter22".into();
        assert_eq!(display_value(&form, AuthField::Email), "dev@example.com");
        assert_eq!(display_value(&form, AuthField::Password), "••••••••");
    }
}
