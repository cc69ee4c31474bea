//! Language badge.

use crate::snippet::Language;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

/// Badge colour of a language. Unknown languages are gray.
pub fn language_color(language: &Language) -> Color {
    match language {
        Language::JavaScript => Color::Yellow,
        Language::Python => Color::Blue,
        Language::Java => Color::LightRed,
        Language::Cpp => Color::Magenta,
        Language::C => Color::Gray,
        Language::Html => Color::Red,
        Language::Css => Color::Cyan,
        Language::Sql => Color::Green,
        Language::Other(_) => Color::Gray,
    }
}

/// Coloured label span, e.g. ` ● Python `.
pub fn language_badge(language: &Language) -> Span<'static> {
    Span::styled(
        format!(" ● {} ", language.label()),
        Style::default()
            .fg(Color::Black)
            .bg(language_color(language))
            .add_modifier(Modifier::BOLD),
    )
}
