use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use tickbox_core::models::Filter;
use tickbox_core::GateView;

use crate::app::{App, DashboardFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::{format_date, items_left_label, tail, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.gate_view() {
        GateView::Protected => {}
        // A redirect is applied on the next sync; draw the placeholder meanwhile.
        GateView::Verifying | GateView::Redirect(_) => {
            let area = centered_rect_fixed(24, 1, area);
            let text = Paragraph::new(Span::styled("Verifying session...", styles::muted_style()));
            frame.render_widget(text, area);
            return;
        }
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // New item input
            Constraint::Min(5),    // List
            Constraint::Length(1), // Filters and counter
        ])
        .split(area);

    render_input(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.dashboard_focus == DashboardFocus::Input;
    let width = area.width.saturating_sub(4) as usize;

    let line = if app.todo_input.is_empty() && !focused {
        Line::from(Span::styled("What needs to be done?", styles::muted_style()))
    } else {
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::raw(tail(&app.todo_input, width.saturating_sub(1))),
            Span::styled(cursor, styles::highlight_style()),
        ])
    };

    let block = Block::default()
        .title(" New todo ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.dashboard_focus == DashboardFocus::List;
    let visible = app.visible_todos();
    let text_width = area.width.saturating_sub(26) as usize;

    let rows: Vec<Row> = visible
        .iter()
        .map(|todo| {
            let (mark, style) = if todo.completed {
                ("[x]", styles::completed_style())
            } else {
                ("[ ]", styles::list_item_style())
            };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(truncate_string(&todo.text, text_width)),
                Cell::from(format_date(&todo.created_at)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Checkbox
        Constraint::Fill(1),    // Text
        Constraint::Length(14), // "Jan 26, 2026"
    ];

    let title = if app.todo_state.loading {
        " Todos (loading...) ".to_string()
    } else {
        format!(" Todos ({}) ", visible.len())
    };

    let mut block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    if let Some(ref error) = app.todo_state.error {
        block = block.title_bottom(Span::styled(format!(" {} ", error), styles::error_style()));
    }

    let table = Table::new(rows, widths)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if focused && !visible.is_empty() {
        state.select(Some(app.todo_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.todo_state.filter;
    let mut spans = vec![Span::styled(
        format!(" {}   ", items_left_label(app.todo_state.items_left())),
        styles::highlight_style(),
    )];

    for (key, filter) in [("1", Filter::All), ("2", Filter::Active), ("3", Filter::Completed)] {
        spans.push(Span::styled(format!("[{}] ", key), styles::help_key_style()));
        spans.push(Span::styled(filter.label(), styles::filter_style(filter == current)));
        spans.push(Span::raw("  "));
    }

    if app.todo_state.has_completed() {
        spans.push(Span::styled("[c] Clear completed", styles::muted_style()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
