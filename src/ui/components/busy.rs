//! Busy indicator: a modal with an optional progress gauge.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use crate::ui::centered_rect;

/// Busy indicator state.
#[derive(Debug, Default)]
pub struct BusyState {
    pub visible: bool,
    pub message: String,
    pub subtext: String,
    /// Percent complete, when progress is shown
    pub progress: Option<u8>,
    /// Latest status label
    pub status: String,
}

impl BusyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, subtext: impl Into<String>, show_progress: bool) {
        self.visible = true;
        self.message = message.into();
        self.subtext = subtext.into();
        self.progress = show_progress.then_some(0);
        self.status.clear();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.progress = None;
        self.status.clear();
    }

    pub fn set_progress(&mut self, percent: u8, status: impl Into<String>) {
        if self.progress.is_some() {
            self.progress = Some(percent.min(100));
        }
        self.status = status.into();
    }
}

/// Render the busy modal.
pub fn render_busy(frame: &mut Frame, area: Rect, state: &BusyState) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Working")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Message + subtext
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Status
            Constraint::Min(0),
        ])
        .split(inner);

    let text = vec![
        Line::from(Span::styled(
            state.message.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            state.subtext.clone(),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(text), chunks[0]);

    if let Some(percent) = state.progress {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .percent(u16::from(percent))
            .label(format!("{}%", percent));
        frame.render_widget(gauge, chunks[1]);
    }

    if !state.status.is_empty() {
        frame.render_widget(
            Paragraph::new(state.status.as_str()).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_only_when_requested() {
        let mut busy = BusyState::new();
        busy.show("Loading data...", "Please wait", false);
        busy.set_progress(40, "Processing");
        assert_eq!(busy.progress, None);
        assert_eq!(busy.status, "Processing");

        busy.show("Syncing", "job-1", true);
        busy.set_progress(140, "Almost");
        assert_eq!(busy.progress, Some(100));

        busy.hide();
        assert!(!busy.visible);
        assert_eq!(busy.progress, None);
    }
}
