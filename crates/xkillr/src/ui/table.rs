use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::app::App;
use crate::selection::HEADER_ROWS;
use crate::ui::{PROMPT_ROWS, format_row};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();
    if area.height == 0 || area.width == 0 {
        return;
    }

    frame.render_widget(Clear, area);
    let table_height = area.height.saturating_sub(PROMPT_ROWS);

    render_header(frame, line_at(area, 0), app);
    render_rows(frame, area, table_height, app);
    render_prompt(frame, line_at(area, table_height), app);
}

/// Screen row of a view position, counted from the top of the table.
pub fn screen_row(position: usize, scroll_offset: usize) -> usize {
    position.saturating_sub(scroll_offset) + HEADER_ROWS
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme().palette();
    let header = Paragraph::new(format_row("USER", "PID", "COMMAND")).style(
        Style::default()
            .fg(palette.header)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(header, area);
}

fn render_rows(frame: &mut Frame, area: Rect, table_height: u16, app: &App) {
    let palette = app.theme().palette();
    let scroll_offset = app.selection().scroll_offset();
    let selected = app.selection().selected();

    for (position, record) in app.visible_rows() {
        let row = screen_row(position, scroll_offset);
        if row >= table_height as usize {
            break;
        }

        let style = if position == selected {
            Style::default()
                .fg(palette.selected_fg)
                .bg(palette.selected_bg)
        } else {
            Style::default().fg(palette.text)
        };
        let text = format_row(&record.user, &record.pid, &record.command);
        frame.render_widget(Paragraph::new(text).style(style), line_at(area, row as u16));
    }
}

fn render_prompt(frame: &mut Frame, area: Rect, app: &App) {
    let palette = app.theme().palette();
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(palette.prompt)),
        Span::styled(app.pattern(), Style::default().fg(palette.text)),
        Span::styled("_", Style::default().fg(palette.prompt)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn line_at(area: Rect, row: u16) -> Rect {
    let y = area.y + row.min(area.height.saturating_sub(1));
    Rect {
        x: area.x,
        y,
        width: area.width,
        height: 1,
    }
}
