#[allow(unused_imports)] /// Needed for Stylize in this scope
use ratatui::style::{Style, Stylize};
use ratatui::style::Color;

pub const USER_COLOR: Color = Color::Cyan;
pub const ASSISTANT_COLOR: Color = Color::Green;
pub const ACCENT_COLOR: Color = Color::Yellow;
pub const MUTED_COLOR: Color = Color::DarkGray;

pub fn dim_unless_focused(is_focused: bool, style: Style) -> Style {
    if is_focused { style.bold() } else { style.dim().italic() }
}

/// Border colour of a panel, highlighted while it has focus
pub fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(ACCENT_COLOR)
    } else {
        Style::default().fg(MUTED_COLOR)
    }
}
