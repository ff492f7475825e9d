//! Record table with sortable headers, status line and pagination control.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::view::{PageLink, ViewController};

/// Table panel state.
#[derive(Debug, Default)]
pub struct TablePanelState {
    /// Selected row on the current page
    pub selected: Option<usize>,

    /// Column the sort cursor is on
    pub header: usize,

    /// Page number being typed after `:`
    pub page_input: Option<String>,

    /// Pagination link the link cursor is on
    pub link: usize,
}

impl TablePanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move selection up.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        let i = match self.selected {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        };
        self.selected = Some(i);
    }

    /// Move selection down.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    /// Select the first row of a freshly rendered page.
    pub fn reset_selection(&mut self, len: usize) {
        self.selected = (len > 0).then_some(0);
    }

    pub fn link_left(&mut self, links: usize) {
        self.link = self.link.min(links.saturating_sub(1)).saturating_sub(1);
    }

    pub fn link_right(&mut self, links: usize) {
        self.link = (self.link + 1).min(links.saturating_sub(1));
    }

    pub fn header_left(&mut self, columns: usize) {
        if columns > 0 {
            self.header = (self.header + columns - 1) % columns;
        }
    }

    pub fn header_right(&mut self, columns: usize) {
        if columns > 0 {
            self.header = (self.header + 1) % columns;
        }
    }
}

/// Render the table, its status line and the pagination control.
pub fn render_table(frame: &mut Frame, area: Rect, controller: &ViewController, state: &TablePanelState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(1), // Pagination
        ])
        .split(area);

    let view = controller.view();
    let sort = controller.state().sort;
    let columns = controller.kind().columns();

    let header_cells = std::iter::once(Cell::from("#")).chain(columns.iter().enumerate().map(|(i, column)| {
        let mut title = column.title.to_string();
        if column.field == sort.column {
            title.push(' ');
            title.push_str(sort.direction.indicator());
        }
        let mut style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        if i == state.header {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Cell::from(title).style(style)
    }));

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| {
            let marker = if controller.is_expanded(row.slot) {
                "▾"
            } else if row.detail.is_some() {
                "▸"
            } else {
                " "
            };
            let number = Cell::from(format!("{}{}", marker, row.number))
                .style(Style::default().fg(Color::DarkGray));
            Row::new(
                std::iter::once(number).chain(
                    row.cells
                        .iter()
                        .map(|cell| Cell::from(cell.clone()).style(Style::default().fg(Color::White))),
                ),
            )
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(6))
        .chain(columns.iter().map(|c| Constraint::Fill(c.width)))
        .collect();

    let title = format!(
        "{} ({} of {})",
        controller.kind().title(),
        view.filtered_count,
        view.total_count
    );
    let table = Table::new(rows, widths)
        .header(Row::new(header_cells).bottom_margin(1))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let mut table_state = TableState::default();
    table_state.select(state.selected);
    frame.render_stateful_widget(table, chunks[0], &mut table_state);

    frame.render_widget(
        Paragraph::new(view.status.as_str()).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );

    frame.render_widget(Paragraph::new(pagination_line(controller, state)), chunks[2]);
}

fn pagination_line(controller: &ViewController, state: &TablePanelState) -> Line<'static> {
    let view = controller.view();
    let mut spans = Vec::new();

    if let Some(links) = &view.links {
        let cursor = state.link.min(links.len().saturating_sub(1));
        for (i, link) in links.iter().enumerate() {
            let mut style = match link {
                PageLink::Number { active: true, .. } => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                PageLink::Previous { enabled: false } | PageLink::Next { enabled: false } => {
                    Style::default().fg(Color::DarkGray)
                }
                PageLink::Ellipsis => Style::default().fg(Color::DarkGray),
                _ => Style::default().fg(Color::White),
            };
            if i == cursor {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(Span::styled(format!(" {} ", link.label()), style));
        }
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(
        format!("Rows: {}", controller.state().page_size),
        Style::default().fg(Color::Cyan),
    ));

    if let Some(input) = &state.page_input {
        spans.push(Span::styled(
            format!("  Go to page: {}▏", input),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}
