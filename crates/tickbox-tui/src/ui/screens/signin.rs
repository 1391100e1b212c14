use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::app::{App, SignInFocus};
use crate::ui::render::{button_line, centered_rect_fixed, dialog_block, field_line};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(46, 12, area);
    frame.render_widget(Clear, area);

    let focus = app.signin_focus;
    let mut lines = vec![
        Line::from(""),
        field_line("Email", &app.signin_email, focus == SignInFocus::Email, false),
        field_line("Password", &app.signin_password, focus == SignInFocus::Password, true),
        Line::from(""),
        button_line("Sign In", focus == SignInFocus::Button),
        Line::from(""),
    ];

    let link_focused = focus == SignInFocus::SignUpLink;
    lines.push(Line::from(vec![
        Span::styled("  No account? ", styles::muted_style()),
        Span::styled("[s] Sign up", styles::field_style(link_focused)),
    ]));

    // Hint from local validation wins over the session's message.
    let message = app
        .signin_hint
        .as_deref()
        .or_else(|| Some(app.session_state.error.as_str()).filter(|e| !e.is_empty()));
    if app.session_state.loading {
        lines.push(Line::from(Span::styled("  Signing in...", styles::highlight_style())));
    } else if let Some(error) = message {
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let paragraph = Paragraph::new(lines).block(dialog_block("Sign In"));
    frame.render_widget(paragraph, area);
}
