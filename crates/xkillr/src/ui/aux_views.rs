use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::App;
use crate::signals::KillOutcome;

/// Replaces the table with the result of the kill.
pub fn render_outcome(frame: &mut Frame, app: &App, outcome: &KillOutcome) {
    let area = frame.size();
    let palette = app.theme().palette();

    let color = match outcome {
        KillOutcome::Sent { .. } => palette.success,
        KillOutcome::Failed { .. } => palette.error,
        KillOutcome::NoSelection => palette.text,
    };

    let mut lines = vec![Line::from(Span::styled(
        outcome.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];

    if outcome.needs_acknowledgement() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Press any key to continue...",
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}
