use ratatui::style::{Color, Modifier, Style};

pub const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub const YEAR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub const TODAY_MODIFIER: Modifier = Modifier::UNDERLINED;

/// Foreground of days inside a decoration, whose background is usually light
pub const HIGHLIGHT_TEXT: Color = Color::Black;

pub mod form {
    use super::*;

    pub const STATUS_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

    pub const HINT_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub const BUTTON_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

    pub const DISABLED_BUTTON_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);
}
