//! Color constants and styles for the judging screen

use ratatui::style::{Color, Modifier, Style};

pub const TITLE_COLOR: Color = Color::Cyan;
pub const MUTED: Color = Color::Gray;
pub const INDEX_COLOR: Color = Color::DarkGray;
pub const ROW_ALT_BG: Color = Color::Indexed(235);
pub const HEADER_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

pub const TAB_ACTIVE: Style = Style::new()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD)
    .add_modifier(Modifier::REVERSED);
pub const TAB_INACTIVE: Style = Style::new().fg(Color::DarkGray);

pub const FIELD_FOCUSED: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
pub const FIELD_IDLE: Style = Style::new().fg(Color::White);
pub const BORDER_FOCUSED: Color = Color::Cyan;
pub const BORDER_IDLE: Color = Color::Indexed(238);

pub const STATUS_BAR_BG: Color = Color::Indexed(236);
pub const STATUS_KEY_COLOR: Color = Color::Cyan;
pub const FLASH_SUCCESS: Color = Color::Green;
pub const FLASH_ERROR: Color = Color::Red;
pub const PENDING_COLOR: Color = Color::Yellow;

pub const POPUP_BORDER: Color = Color::Cyan;

/// Traffic-light color for a 0-100 total
pub fn total_color(total: f64) -> Color {
    if total >= 80.0 {
        Color::Green
    } else if total >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
