use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::colors::parse_css_color;
use crate::config::MapDetail;
use crate::dashboard::view::MapState;

/// Degrees of longitude visible at a zoom level, roughly matching slippy
/// map tiles.
pub fn longitude_span(zoom: u8) -> f64 {
    360.0 / 2_f64.powi(i32::from(zoom.min(18)))
}

/// Viewport `[x, y]` bounds centered on a point, clamped to the globe.
pub fn viewport(latitude: f64, longitude: f64, zoom: u8, aspect: f64) -> ([f64; 2], [f64; 2]) {
    let half_x = (longitude_span(zoom) / 2.0).min(180.0);
    let half_y = (half_x / aspect.max(0.1)).min(90.0);

    let center_x = longitude.clamp(-180.0 + half_x, 180.0 - half_x);
    let center_y = latitude.clamp(-90.0 + half_y, 90.0 - half_y);

    (
        [center_x - half_x, center_x + half_x],
        [center_y - half_y, center_y + half_y],
    )
}

pub fn render_map(map: Option<&MapState>, animation: f64, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(map) = map else {
        let paragraph = Paragraph::new("Waiting for location...")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    };

    let block = block.title_bottom(TextLine::from(format!(" {} ", map.view.attribution)).right_aligned());
    let inner = block.inner(area);
    if inner.width < 4 || inner.height < 4 {
        f.render_widget(block, area);
        return;
    }

    // Braille cells are 2x4 dots and terminal cells are about twice as tall
    // as they are wide.
    let aspect = f64::from(inner.width) / (f64::from(inner.height) * 2.0);
    let center = map.marker.as_ref().map_or(map.view.center, |m| m.coordinate);
    let (x_bounds, y_bounds) = viewport(center.latitude, center.longitude, map.view.zoom, aspect);
    let resolution = match map.view.detail {
        MapDetail::Low => MapResolution::Low,
        MapDetail::High => MapResolution::High,
    };
    let marker_radius = (x_bounds[1] - x_bounds[0]) / 60.0;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution,
            });
            ctx.layer();

            let Some(marker) = map.marker.as_ref() else {
                return;
            };
            let color = parse_css_color(&marker.color);
            let (x, y) = (marker.coordinate.longitude, marker.coordinate.latitude);

            if marker.pulsing {
                // The halo grows and shrinks with the animation counter.
                let pulse = 1.5 + animation.sin().abs() * 2.0;
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: marker_radius * pulse,
                    color,
                });
            }
            ctx.draw(&Circle {
                x,
                y,
                radius: marker_radius,
                color,
            });
            ctx.draw(&Points {
                coords: &[(x, y)],
                color,
            });

            let label_x = x + marker_radius * 2.0;
            ctx.print(
                label_x,
                y + marker_radius * 2.0,
                TextLine::from(Span::styled(
                    marker.title.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
            );
            if !marker.subtitle.is_empty() {
                ctx.print(
                    label_x,
                    y,
                    TextLine::from(Span::styled(
                        marker.subtitle.clone(),
                        Style::default().fg(Color::White),
                    )),
                );
            }
        });

    f.render_widget(canvas, area);
}
