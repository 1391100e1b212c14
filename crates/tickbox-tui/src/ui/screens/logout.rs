use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::render::{centered_rect_fixed, dialog_block};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(46, 5, area);
    frame.render_widget(Clear, area);

    let line = if app.logout_complete {
        Line::from(Span::styled("  Successfully logged out!", styles::success_style()))
    } else {
        Line::from(Span::styled("  Logging out...", styles::highlight_style()))
    };

    let paragraph = Paragraph::new(vec![Line::from(""), line]).block(dialog_block("Logout"));
    frame.render_widget(paragraph, area);
}
