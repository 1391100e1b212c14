use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Notice, SignUpFocus};
use crate::ui::render::{button_line, centered_rect_fixed, dialog_block, field_line};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(46, 14, area);
    frame.render_widget(Clear, area);

    let focus = app.signup_focus;
    let mut lines = vec![
        Line::from(""),
        field_line("Username", &app.signup_username, focus == SignUpFocus::Username, false),
        field_line("Email", &app.signup_email, focus == SignUpFocus::Email, false),
        field_line("Password", &app.signup_password, focus == SignUpFocus::Password, true),
        Line::from(""),
        button_line("Sign Up", focus == SignUpFocus::Button),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Have an account? ", styles::muted_style()),
            Span::styled("Sign in", styles::field_style(focus == SignUpFocus::SignInLink)),
        ]),
    ];

    match app.signup_notice {
        Some(Notice::Success(ref message)) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("  {}", message), styles::success_style())));
        }
        Some(Notice::Error(ref message)) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("  {}", message), styles::error_style())));
        }
        None if app.session_state.loading => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Creating account...",
                styles::highlight_style(),
            )));
        }
        None => {}
    }

    let paragraph = Paragraph::new(lines)
        .block(dialog_block("Sign Up"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
