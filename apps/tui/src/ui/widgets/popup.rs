use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::form::ManualForm;
use crate::app::input::KEY_BINDINGS;

/// A `width` x `height` rect in the middle of `area`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn render_form_popup(form: &ManualForm, animation: f64, f: &mut Frame<'_>, area: Rect) {
    let height = u16::try_from(form.fields.len()).unwrap_or(u16::MAX).saturating_add(5);
    let popup = centered_rect(56, height, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Manual sensor readings ")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    // Blinking cursor on the selected field
    let cursor = if animation.sin() > 0.0 { "_" } else { " " };

    let mut lines: Vec<TextLine<'_>> = form
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let selected = index == form.selected;
            let marker = if selected { "> " } else { "  " };
            let label_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            TextLine::from(vec![
                Span::styled(format!("{marker}{:<22}", field.label), label_style),
                Span::styled(field.value.clone(), Style::default().fg(Color::White)),
                Span::raw(if selected { cursor } else { "" }),
            ])
        })
        .collect();

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "Enter: predict  Tab/↑↓: field  Del: clear  Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), popup);
}

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let lines: Vec<TextLine<'_>> = KEY_BINDINGS
        .iter()
        .map(|&(key, description)| {
            TextLine::from(vec![
                Span::styled(
                    format!("{key:>12}  "),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(description, Style::default().fg(Color::White)),
            ])
        })
        .collect();
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_rect(64, height, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Help (F1 to close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 10, area);
        assert_eq!(popup, Rect::new(25, 15, 50, 10));

        let small = Rect::new(0, 0, 20, 5);
        let popup = centered_rect(50, 10, small);
        assert_eq!(popup, small);
    }
}
