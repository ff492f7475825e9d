//! Main UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Dataset};

pub mod components;

pub use components::*;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: [tabs] [content] [key hints]
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Content
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_tabs(frame, main_chunks[0], app);

    match app.active_dataset() {
        Some(dataset) => render_dataset(frame, main_chunks[1], dataset, app.show_charts),
        None => render_placeholder(frame, main_chunks[1], app.pending_loads > 0),
    }

    render_footer(frame, main_chunks[2], app);

    if app.busy.visible {
        render_busy(frame, area, &app.busy);
    }

    // Render help overlay if active
    if app.show_help {
        render_help(frame, area);
    }

    // Render error message if present
    if let Some(error) = &app.error_message {
        render_error(frame, area, error);
    }
}

/// Render the tab bar, one tab per loaded dataset.
fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .datasets
        .iter()
        .enumerate()
        .map(|(i, dataset)| {
            let style = if i == app.active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(
                format!("{} {}", i + 1, dataset.kind().title()),
                style,
            ))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("spiffy-tui")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .select(app.active)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Render the table, filter panel, detail panel and charts of a dataset.
fn render_dataset(frame: &mut Frame, area: Rect, dataset: &Dataset, show_charts: bool) {
    let controller = &dataset.controller;

    // Content area: [table area] [charts]
    let (table_area, chart_area) = if show_charts && !controller.kind().charts().is_empty() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    // Filter panel sits to the left of the table
    let table_area = if dataset.filters.visible {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(20)])
            .split(table_area);
        render_filters(frame, chunks[0], &dataset.controls, &dataset.filters);
        chunks[1]
    } else {
        table_area
    };

    let expanded = dataset
        .table
        .selected
        .filter(|slot| controller.is_expanded(*slot))
        .and_then(|slot| controller.view().rows.get(slot));

    match expanded.and_then(|row| row.detail.as_ref().map(|detail| (row, detail))) {
        Some((row, detail)) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(table_area);
            render_table(frame, chunks[0], controller, &dataset.table);

            let title = controller
                .store()
                .get(row.key)
                .map(|record| record.name())
                .unwrap_or_else(|| row.key.to_string());
            render_detail(
                frame,
                chunks[1],
                &title,
                detail,
                controller.is_raw_expanded(row.slot),
            );
        }
        None => render_table(frame, table_area, controller, &dataset.table),
    }

    if let Some(chart_area) = chart_area {
        render_charts(frame, chart_area, controller, dataset.selected_key());
    }
}

/// Shown until the first snapshot arrives.
fn render_placeholder(frame: &mut Frame, area: Rect, loading: bool) {
    let text = if loading {
        "Loading data..."
    } else {
        "No snapshot loaded. Pass a snapshot file or list them under [data] in config.toml."
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Render the key hint line for the current input mode.
fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = if app.busy.visible {
        "Esc stop watching"
    } else if app.is_searching() {
        "Enter apply  Esc cancel"
    } else if app.is_jumping() {
        "Enter go  Esc cancel"
    } else if app.filters_visible() {
        "Tab/S-Tab focus  ←/→ adjust  R reset  f/Esc close"
    } else {
        "j/k rows  n/p pages  ←/→ column  s sort  Enter details  / search  f filters  ? help  q quit"
    };

    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Render the help overlay.
fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Table"),
        Line::from("  j/k or ↑/↓    Move up/down"),
        Line::from("  h/l or ←/→    Move column cursor"),
        Line::from("  s             Sort by column (again to reverse)"),
        Line::from("  Enter         Toggle row details"),
        Line::from("  J             Toggle full data in details"),
        Line::from("  1-3           Switch dataset"),
        Line::from("  Tab/Shift+Tab Cycle datasets"),
        Line::from(""),
        section("Pages"),
        Line::from("  n/p           Next/Previous page"),
        Line::from("  g/G           First/Last page"),
        Line::from("  :             Go to page"),
        Line::from("  z             Cycle rows per page (25/50/100/All)"),
        Line::from("  [/]           Move between page links"),
        Line::from("  o             Follow page link"),
        Line::from(""),
        section("Filters"),
        Line::from("  /             Search"),
        Line::from("  f             Toggle filter panel"),
        Line::from("  Tab/Shift+Tab Focus next/previous control (panel open)"),
        Line::from("  ←/→           Adjust focused control (panel open)"),
        Line::from("  R             Reset filters and sort"),
        Line::from(""),
        section("Other"),
        Line::from("  c             Toggle charts"),
        Line::from("  Esc           Stop watching a sync job"),
        Line::from("  ?             Show this help"),
        Line::from("  x             Clear error message"),
        Line::from("  q             Quit"),
        Line::from(""),
        section("Mouse"),
        Line::from("  Scroll        Navigate rows"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render an error message overlay.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::fixtures::synthetic_tracks;
    use crate::data::Snapshot;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 20, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 10);
        assert_eq!(inner.x, 20);
    }

    #[test]
    fn test_render_loaded_dataset() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::default(), tx);
        app.datasets.push(Dataset::new(
            Snapshot {
                store: synthetic_tracks(120),
                ..Snapshot::default()
            },
            app.config.page_size(),
        ));

        let mut terminal = Terminal::new(TestBackend::new(160, 60)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Showing 50 of 120 tracks"));
        assert!(text.contains("Audio Features"));
    }
}
