use crate::app::App;
use crate::ui::widgets::charts::render_risk_chart;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::panels::{render_assessment, render_badge, render_logs, render_weather};
use crate::ui::widgets::popup::{render_form_popup, render_help_popup};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(f);

    render_title_section(app, f, main_layout[0]);
    render_content_section(app, f, main_layout[1]);
    render_logs(&app.logs, f, main_layout[2]);
    render_shortcuts(f, main_layout[3]);

    if app.form.open {
        render_form_popup(&app.form, app.animation_counter, f, f.area());
    }
    if app.show_help {
        render_help_popup(f, f.area());
    }
}

fn build_main_layout(f: &Frame<'_>) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title and status
            Constraint::Min(12),   // Map and risk panels
            Constraint::Length(7), // Log pane
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)))
        .to_vec()
}

fn spinner_frame(animation: f64) -> &'static str {
    // animation runs 0..2π; four frames per cycle
    let phase = (animation / std::f64::consts::FRAC_PI_2).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (phase.max(0.0) as usize) % SPINNER.len();
    SPINNER[index]
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Disaster Risk Dashboard ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = title_block.inner(area);
    f.render_widget(title_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(inner);

    let mut status = vec![Span::styled(
        app.view.status.clone(),
        Style::default().fg(Color::White),
    )];
    if app.busy() {
        status.push(Span::styled(
            format!("  {}", spinner_frame(app.animation_counter)),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(Paragraph::new(TextLine::from(status)), chunks[0]);

    let (label, color) = match app.backend_online {
        Some(true) => ("backend online", Color::Green),
        Some(false) => ("backend offline", Color::Red),
        None => ("backend ...", Color::Gray),
    };
    let backend = Paragraph::new(TextLine::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(label, Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(backend, chunks[1]);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let horizontal_split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    render_map(
        app.view.map.as_ref(),
        app.animation_counter,
        f,
        horizontal_split[0],
    );

    let right_split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Badge
            Constraint::Length(6), // Type and advice
            Constraint::Min(6),    // Chart
            Constraint::Length(6), // Weather
        ])
        .split(horizontal_split[1]);

    render_badge(app.view.badge.as_ref(), f, right_split[0]);
    render_assessment(
        app.view.disaster_type.as_deref(),
        app.view.advice.as_deref(),
        f,
        right_split[1],
    );
    render_risk_chart(app.view.chart.as_ref(), f, right_split[2]);
    render_weather(app.view.weather.as_ref(), f, right_split[3]);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(Color::Gray);

    let shortcuts = TextLine::from(vec![
        Span::styled("r", key_style),
        Span::styled(": refresh  ", text_style),
        Span::styled("m", key_style),
        Span::styled(": manual readings  ", text_style),
        Span::styled("F1", key_style),
        Span::styled(": help  ", text_style),
        Span::styled("q", key_style),
        Span::styled(": quit", text_style),
    ]);

    f.render_widget(
        Paragraph::new(shortcuts).alignment(Alignment::Center),
        area,
    );
}
