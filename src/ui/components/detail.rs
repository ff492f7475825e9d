//! Detail panel for an expanded row.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::data::DetailPayload;

/// Render a row's detail payload. The raw data section is shown only
/// when `show_raw` is set.
pub fn render_detail(frame: &mut Frame, area: Rect, title: &str, payload: &DetailPayload, show_raw: bool) {
    let mut lines = Vec::new();

    for section in &payload.sections {
        lines.push(Line::from(Span::styled(
            section.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for entry in &section.entries {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", entry.label), Style::default().fg(Color::Cyan)),
                Span::raw(entry.value.clone()),
            ]));
        }
        lines.push(Line::from(""));
    }

    if let Some(raw) = payload.raw_pretty() {
        if show_raw {
            lines.push(Line::from(Span::styled(
                "▾ Full Data",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.extend(raw.lines().map(|l| Line::from(l.to_string())));
        } else {
            lines.push(Line::from(Span::styled(
                "▸ Full Data (J to expand)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}
