use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const BRAND: Color = Color::Rgb(86, 156, 214);
pub const DONE: Color = Color::Rgb(106, 170, 100);
pub const WARN: Color = Color::Rgb(214, 170, 72);
pub const DANGER: Color = Color::Rgb(208, 80, 80);
pub const DIM: Color = Color::Rgb(120, 120, 130);
pub const CURSOR_BG: Color = Color::Rgb(44, 50, 70);
pub const BAR_BG: Color = Color::Rgb(28, 30, 38);

pub fn title_style() -> Style {
    Style::new().fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::new().bg(CURSOR_BG).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::new().fg(Color::Reset)
}

/// Completed items are dimmed and struck through
pub fn completed_style() -> Style {
    Style::new().fg(DIM).add_modifier(Modifier::CROSSED_OUT)
}

pub fn muted_style() -> Style {
    Style::new().fg(DIM)
}

pub fn highlight_style() -> Style {
    Style::new().fg(WARN)
}

pub fn success_style() -> Style {
    Style::new().fg(DONE)
}

pub fn error_style() -> Style {
    Style::new().fg(DANGER).add_modifier(Modifier::BOLD)
}

/// Active filter is underlined in the brand color
pub fn filter_style(active: bool) -> Style {
    match active {
        true => title_style().add_modifier(Modifier::UNDERLINED),
        false => list_item_style(),
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::new().fg(if focused { BRAND } else { DIM })
}

/// Style for a focusable form element
pub fn field_style(focused: bool) -> Style {
    if focused {
        selected_style()
    } else {
        list_item_style()
    }
}

pub fn status_bar_style() -> Style {
    Style::new().bg(BAR_BG).fg(Color::Reset)
}

pub fn help_key_style() -> Style {
    highlight_style().add_modifier(Modifier::BOLD)
}
