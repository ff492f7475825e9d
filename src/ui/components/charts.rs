//! Chart panel: draws the aggregator's chart slots.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::data::RecordKey;
use crate::view::aggregate::{Bucket, ChartData, FeatureAverage, ScatterSeries};
use crate::view::ViewController;

/// Render every chart of the active dataset side by side.
///
/// `selected` is the record under the table cursor; scatter charts
/// highlight it and show its label.
pub fn render_charts(frame: &mut Frame, area: Rect, controller: &ViewController, selected: Option<RecordKey>) {
    let specs = controller.kind().charts();
    if specs.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = specs
        .iter()
        .map(|_| Constraint::Ratio(1, specs.len() as u32))
        .collect();
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (spec, slot) in specs.iter().zip(slots.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(spec.title)
            .border_style(Style::default().fg(Color::Magenta));

        let Some(handle) = controller.charts().get(spec.id) else {
            continue;
        };

        if handle.data.is_empty() {
            let empty = Paragraph::new("No data")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, *slot);
            continue;
        }

        match &handle.data {
            ChartData::Histogram(buckets) => render_histogram(frame, *slot, buckets, block),
            ChartData::Ranking(buckets) => render_ranking(frame, *slot, buckets, block),
            ChartData::Profile(averages) => render_profile(frame, *slot, averages, block),
            ChartData::Scatter(series) => render_scatter(frame, *slot, series, selected, block),
        }
    }
}

fn render_histogram(frame: &mut Frame, area: Rect, buckets: &[Bucket], block: Block) {
    let bars: Vec<Bar> = buckets
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.count)
                .label(Line::from(b.label.split('-').next().unwrap_or_default().to_string()))
        })
        .collect();

    // Ten buckets share the inner width
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / buckets.len().max(1) as u16).saturating_sub(1).max(1);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    frame.render_widget(chart, area);
}

fn render_ranking(frame: &mut Frame, area: Rect, buckets: &[Bucket], block: Block) {
    let bars: Vec<Bar> = buckets
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.count)
                .label(Line::from(b.label.clone()))
                .text_value(b.count.to_string())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(chart, area);
}

fn render_profile(frame: &mut Frame, area: Rect, averages: &[FeatureAverage], block: Block) {
    // A feature with no valid samples draws as 0
    let bars: Vec<Bar> = averages
        .iter()
        .map(|a| {
            let mean = a.mean.unwrap_or(0.0);
            Bar::default()
                .value((mean * 100.0).round() as u64)
                .label(Line::from(a.field.label().chars().take(5).collect::<String>()))
                .text_value(format!("{:.2}", mean))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .max(100)
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Yellow))
        .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));

    frame.render_widget(chart, area);
}

fn render_scatter(frame: &mut Frame, area: Rect, series: &ScatterSeries, selected: Option<RecordKey>, block: Block) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(block.inner(area));
    frame.render_widget(block, area);

    let points: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
    let highlighted = selected.and_then(|key| series.points.iter().find(|p| p.key == key));
    let marked: Vec<(f64, f64)> = highlighted.map(|p| vec![(p.x, p.y)]).unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&points),
        Dataset::default()
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .data(&marked),
    ];

    let chart = Chart::new(datasets)
        .x_axis(axis(series.x_field.label(), series.x_bounds))
        .y_axis(axis(series.y_field.label(), series.y_bounds));
    frame.render_widget(chart, chunks[0]);

    let caption = match highlighted {
        Some(point) => point.label.clone(),
        None => format!("{} points", series.points.len()),
    };
    frame.render_widget(
        Paragraph::new(caption).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

fn axis(title: &str, bounds: [f64; 2]) -> Axis<'static> {
    let precision = if bounds[1] - bounds[0] > 10.0 { 0 } else { 1 };
    Axis::default()
        .title(title.to_string())
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![
            format!("{:.*}", precision, bounds[0]),
            format!("{:.*}", precision, (bounds[0] + bounds[1]) / 2.0),
            format!("{:.*}", precision, bounds[1]),
        ])
}
