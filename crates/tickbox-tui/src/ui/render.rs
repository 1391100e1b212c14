use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use tickbox_core::Route;

use crate::app::{App, AppState};

use super::screens::{dashboard, logout, signin, signup};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  tickbox";
    let backend = app.config.backend_url.as_str();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + backend.len() as u16 + 4)
                as usize,
        )),
        Span::styled(backend, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.route {
        Route::SignIn => signin::render(frame, app, area),
        Route::SignUp => signup::render(frame, app, area),
        Route::Dashboard => dashboard::render(frame, app, area),
        Route::Logout => logout::render(frame, app, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    match app.route {
        Route::SignIn => "[Tab] next field | [Enter] submit | [Esc] quit",
        Route::SignUp => "[Tab] next field | [Enter] submit | [Esc] back",
        Route::Dashboard => {
            "[Tab] list | [Space] toggle | [c]lear done | [f]ilter | [L]ogout | [q]uit"
        }
        Route::Logout => "[q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg.text),
        None => String::new(),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::success_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Bordered box used by the form screens and overlays
pub fn dialog_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(format!(" {} ", title), styles::title_style()))
        .style(Style::default())
}

/// One labelled input field line: `Label: [value▌]`
pub fn field_line<'a>(label: &'a str, value: &str, focused: bool, masked: bool) -> Line<'a> {
    let shown: String = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    // Keep the tail visible once the value outgrows the box.
    let visible = crate::utils::tail(&shown, 22);
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {:>9}: [", label), styles::muted_style()),
        Span::styled(format!("{:<22}{}", visible, cursor), styles::field_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

/// A focusable button: `[ ▶ Label ◀ ]`
pub fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("              ["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(dialog_block("Quit"));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(46, 10, outer);
        assert_eq!(inner, Rect::new(27, 15, 46, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_small_area() {
        let outer = Rect::new(5, 5, 20, 6);
        let inner = centered_rect_fixed(46, 10, outer);
        assert_eq!(inner.width, 20);
        assert_eq!(inner.height, 6);
        assert_eq!(inner.x, 5);
    }
}
