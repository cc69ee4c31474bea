//! UI components module.
//!
//! Contains ratatui widgets for displaying the application interface.

pub mod auth;
pub mod badge;
pub mod filters;
pub mod form;
pub mod list;
pub mod modal;
pub mod navbar;
pub mod search;

pub use auth::render_auth;
pub use filters::render_filters;
pub use form::render_form;
pub use list::render_list;
pub use modal::{render_confirm_delete, render_snippet_modal};
pub use navbar::render_navbar;
pub use search::render_search;

use ratatui::layout::Rect;

/// Rectangle of `percent_x` × `percent_y` centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y.min(100)) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Rectangle of fixed size centred in `area`, clipped to it.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(80, 60, area);
        assert_eq!(rect, Rect::new(10, 10, 80, 30));
    }

    #[test]
    fn test_centered_rect_wide_terminal() {
        let area = Rect::new(0, 0, 1000, 800);
        let rect = centered_rect(80, 70, area);
        assert_eq!(rect, Rect::new(100, 120, 800, 560));
    }

    #[test]
    fn test_centered_fixed_clips() {
        let area = Rect::new(5, 5, 20, 10);
        let rect = centered_fixed(50, 4, area);
        assert_eq!(rect, Rect::new(5, 8, 20, 4));
    }
}
