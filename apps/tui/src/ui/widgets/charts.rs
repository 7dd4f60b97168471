use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use super::colors::parse_css_color;
use crate::dashboard::ChartSeries;

/// `(index, value)` pairs for the chart, oldest first.
pub fn series_points(series: &ChartSeries) -> Vec<(f64, f64)> {
    series
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| (index_as_f64(index), *value))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn index_as_f64(index: usize) -> f64 {
    index as f64
}

pub fn render_risk_chart(series: Option<&ChartSeries>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Risk Probability (%) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(series) = series else {
        let paragraph = Paragraph::new("No predictions yet")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    };

    let line_color = parse_css_color(&series.line_color);
    let fill_color = parse_css_color(&series.fill_color);
    let points = series_points(series);
    let x_max = index_as_f64(series.values.len().saturating_sub(1)).max(1.0);

    // Vertical bars under the line stand in for the area fill.
    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(fill_color))
            .data(&points),
        Dataset::default()
            .name("Risk")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(line_color))
            .data(&points),
    ];

    let x_labels: Vec<Span<'_>> = series
        .labels
        .iter()
        .map(|label| Span::raw(label.clone()))
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );

    f.render_widget(chart, area);
}
