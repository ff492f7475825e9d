//! Filter panel: search box, dropdowns and minimum sliders.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::view::controls::{ControlKind, FilterControl};
use crate::view::FilterCriteria;

/// Current value of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlValue {
    /// Index into the control's options; `None` is the placeholder.
    Select(Option<usize>),
    /// Slider position.
    Slider(u32),
}

impl ControlValue {
    fn initial(control: &FilterControl) -> Self {
        match control.kind {
            ControlKind::Select { .. } => Self::Select(None),
            ControlKind::Slider { .. } => Self::Slider(0),
        }
    }
}

/// Filter panel state.
#[derive(Debug, Default)]
pub struct FilterPanelState {
    /// Whether the panel is shown
    pub visible: bool,

    /// Focused control
    pub focus: usize,

    /// Applied search text
    pub search: String,

    /// Search text being typed, while the search box is open
    pub draft: Option<String>,

    values: Vec<ControlValue>,
}

impl FilterPanelState {
    pub fn new(controls: &[FilterControl]) -> Self {
        Self {
            values: controls.iter().map(ControlValue::initial).collect(),
            ..Self::default()
        }
    }

    pub fn focus_next(&mut self) {
        if !self.values.is_empty() {
            self.focus = (self.focus + 1) % self.values.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.values.is_empty() {
            self.focus = (self.focus + self.values.len() - 1) % self.values.len();
        }
    }

    /// Step the focused control forward. Returns true if its value changed.
    pub fn increase(&mut self, controls: &[FilterControl]) -> bool {
        self.step(controls, true)
    }

    /// Step the focused control backward. Returns true if its value changed.
    pub fn decrease(&mut self, controls: &[FilterControl]) -> bool {
        self.step(controls, false)
    }

    fn step(&mut self, controls: &[FilterControl], forward: bool) -> bool {
        let (Some(control), Some(value)) = (controls.get(self.focus), self.values.get_mut(self.focus)) else {
            return false;
        };

        let next = match (&control.kind, *value) {
            (ControlKind::Select { options, .. }, ControlValue::Select(selected)) => {
                // Cycle: placeholder -> first .. last -> placeholder
                let len = options.len();
                let next = match (selected, forward) {
                    (_, _) if len == 0 => None,
                    (None, true) => Some(0),
                    (None, false) => Some(len - 1),
                    (Some(i), true) if i + 1 < len => Some(i + 1),
                    (Some(i), false) if i > 0 => Some(i - 1),
                    (Some(_), _) => None,
                };
                ControlValue::Select(next)
            }
            (ControlKind::Slider { max, step, .. }, ControlValue::Slider(position)) => {
                let next = if forward {
                    position.saturating_add(*step).min(*max)
                } else {
                    position.saturating_sub(*step)
                };
                ControlValue::Slider(next)
            }
            _ => return false,
        };

        let changed = next != *value;
        *value = next;
        changed
    }

    /// Open the search box with the applied text.
    pub fn open_search(&mut self) {
        self.draft = Some(self.search.clone());
    }

    /// Close the search box, discarding the draft.
    pub fn cancel_search(&mut self) {
        self.draft = None;
    }

    /// Apply the draft. Returns true if the search text changed.
    pub fn submit_search(&mut self) -> bool {
        match self.draft.take() {
            Some(draft) if draft != self.search => {
                self.search = draft;
                true
            }
            _ => false,
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(draft) = &mut self.draft {
            draft.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.pop();
        }
    }

    pub fn is_searching(&self) -> bool {
        self.draft.is_some()
    }

    /// Clear every control and the search text.
    pub fn reset(&mut self, controls: &[FilterControl]) {
        self.search.clear();
        self.draft = None;
        self.values = controls.iter().map(ControlValue::initial).collect();
    }

    /// Build the criteria the controls currently describe.
    ///
    /// Sliders always contribute a minimum, including at position 0.
    pub fn criteria(&self, controls: &[FilterControl]) -> FilterCriteria {
        let mut criteria = FilterCriteria::new().with_text(self.search.trim());

        for (control, value) in controls.iter().zip(&self.values) {
            match (&control.kind, value) {
                (ControlKind::Select { options, .. }, ControlValue::Select(Some(i))) => {
                    if let Some(option) = options.get(*i) {
                        criteria = criteria.with_equal(control.field, option.clone());
                    }
                }
                (ControlKind::Slider { scale, .. }, ControlValue::Slider(position)) => {
                    criteria = criteria.with_minimum(control.field, scale.threshold(*position));
                }
                _ => {}
            }
        }

        criteria
    }

    /// Display text of a control's value.
    fn value_text(&self, control: &FilterControl, index: usize) -> String {
        match (&control.kind, self.values.get(index)) {
            (ControlKind::Select { options, placeholder }, Some(ControlValue::Select(selected))) => selected
                .and_then(|i| options.get(i))
                .cloned()
                .unwrap_or_else(|| placeholder.to_string()),
            (ControlKind::Slider { max, scale, .. }, Some(ControlValue::Slider(position))) => {
                format!("{} {}", slider_bar(*position, *max), scale.display(*position))
            }
            _ => String::new(),
        }
    }
}

fn slider_bar(position: u32, max: u32) -> String {
    const WIDTH: u32 = 10;
    let filled = if max == 0 { 0 } else { position * WIDTH / max };
    format!(
        "{}{}",
        "━".repeat(filled as usize),
        "─".repeat((WIDTH - filled) as usize)
    )
}

/// Render the filter panel.
pub fn render_filters(frame: &mut Frame, area: Rect, controls: &[FilterControl], state: &FilterPanelState) {
    let mut lines = vec![Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::Cyan)),
        match &state.draft {
            Some(draft) => Span::styled(
                format!("{}▏", draft),
                Style::default().fg(Color::Yellow),
            ),
            None if state.search.is_empty() => {
                Span::styled("(press / to search)", Style::default().fg(Color::DarkGray))
            }
            None => Span::raw(state.search.clone()),
        },
    ])];
    lines.push(Line::from(""));

    for (i, control) in controls.iter().enumerate() {
        let focused = i == state.focus;
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let marker = if focused { "▶ " } else { "  " };

        lines.push(Line::from(vec![
            Span::styled(format!("{}{}: ", marker, control.label), label_style),
            Span::raw(state.value_text(control, i)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab focus  ←/→ change  R reset  f close",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Filters")
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
