use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::collections::VecDeque;

use super::colors::parse_css_color;
use crate::dashboard::view::{Badge, WeatherPanel, PLACEHOLDER};

/// Badge style: background from the backend color, plus severity emphasis.
pub fn badge_style(badge: &Badge) -> Style {
    let mut style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    if let Some(color) = &badge.color {
        style = style.bg(parse_css_color(color));
    }
    if badge.style.high {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if badge.style.extreme {
        style = style.add_modifier(Modifier::SLOW_BLINK | Modifier::REVERSED);
    }
    style
}

pub fn render_badge(badge: Option<&Badge>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Risk ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = badge.map_or_else(
        || TextLine::from(Span::styled("Waiting for prediction...", Style::default().fg(Color::Gray))),
        |badge| TextLine::from(Span::styled(format!(" {} ", badge.text), badge_style(badge))),
    );

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

pub fn render_assessment(
    disaster_type: Option<&str>,
    advice: Option<&str>,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let block = Block::default()
        .title(" Assessment ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        TextLine::from(vec![
            Span::styled("Type: ", Style::default().fg(Color::Gray)),
            Span::styled(
                disaster_type.unwrap_or(PLACEHOLDER).to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(""),
        TextLine::from(Span::styled(
            advice.unwrap_or_default().to_string(),
            Style::default().fg(Color::White),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

pub fn render_weather(panel: Option<&WeatherPanel>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Weather ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines: Vec<TextLine<'_>> = match panel {
        None => vec![TextLine::from(Span::styled(
            "No weather yet",
            Style::default().fg(Color::Gray),
        ))],
        Some(unavailable @ WeatherPanel::Unavailable) => unavailable
            .lines()
            .into_iter()
            .map(|line| TextLine::from(Span::styled(line, Style::default().fg(Color::Red))))
            .collect(),
        Some(loaded) => loaded
            .lines()
            .into_iter()
            .map(|line| {
                let (label, value) = line.split_once(": ").unwrap_or(("", line.as_str()));
                TextLine::from(vec![
                    Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
                    Span::styled(value.to_string(), Style::default().fg(Color::White)),
                ])
            })
            .collect(),
    };

    let paragraph = Paragraph::new(Text::from(lines)).block(block);
    f.render_widget(paragraph, area);
}

pub fn render_logs(logs: &VecDeque<String>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let visible = usize::from(area.height.saturating_sub(2));
    let lines: Vec<TextLine<'_>> = logs
        .iter()
        .skip(logs.len().saturating_sub(visible))
        .map(|line| {
            let color = if line.contains("WARN") || line.contains("ERROR") {
                Color::Yellow
            } else {
                Color::Gray
            };
            TextLine::from(Span::styled(line.as_str(), Style::default().fg(color)))
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::view::BadgeStyle;

    #[test]
    fn test_badge_style_modifiers() {
        let mut badge = Badge {
            text: "Risk: 90.0% • EXTREME".to_string(),
            color: Some("#ff0000".to_string()),
            style: BadgeStyle {
                high: false,
                extreme: true,
            },
        };
        let style = badge_style(&badge);
        assert_eq!(style.bg, Some(Color::Rgb(255, 0, 0)));
        assert!(style.add_modifier.contains(Modifier::SLOW_BLINK));
        assert!(!style.add_modifier.contains(Modifier::UNDERLINED));

        badge.style = BadgeStyle {
            high: true,
            extreme: false,
        };
        let style = badge_style(&badge);
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!style.add_modifier.contains(Modifier::SLOW_BLINK));
    }

    #[test]
    fn test_unavailable_badge_has_no_background() {
        let style = badge_style(&Badge::unavailable());
        assert_eq!(style.bg, None);
    }
}
