use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::app::{handle_input, App, UserAction};
use crate::dashboard::{Dashboard, ViewState};
use crate::domain::{Coordinate, Overrides, Prediction, WeatherData};
use crate::error::DashboardError;
use crate::location::{LocationResolver, ResolvedLocation};
use crate::ui;

/// Outcomes of background work, applied on the UI loop in arrival order.
#[derive(Debug)]
pub enum DashboardEvent {
    Located(Result<ResolvedLocation, DashboardError>),
    Predicted {
        coordinate: Coordinate,
        outcome: Result<Prediction, DashboardError>,
    },
    Weather(Result<WeatherData, DashboardError>),
    Health(Result<bool, DashboardError>),
}

/// Starts network calls on the runtime and reports back through a channel.
/// Requests are never cancelled: a slow response still lands and overwrites
/// whatever is on screen.
#[derive(Clone)]
pub struct TaskSpawner {
    sender: UnboundedSender<DashboardEvent>,
}

impl TaskSpawner {
    pub fn channel() -> (Self, UnboundedReceiver<DashboardEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(sender: &UnboundedSender<DashboardEvent>, event: DashboardEvent) {
        if sender.send(event).is_err() {
            debug!("event loop closed, dropping result");
        }
    }

    pub fn locate(&self, resolver: LocationResolver) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = resolver.resolve().await;
            Self::send(&sender, DashboardEvent::Located(outcome));
        });
    }

    /// The coordinate is captured now, not when the request goes out.
    pub fn predict(&self, dashboard: &Dashboard, coordinate: Coordinate, overrides: Overrides) {
        let api = dashboard.api();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = Dashboard::fetch_prediction(api.as_ref(), coordinate, &overrides).await;
            Self::send(
                &sender,
                DashboardEvent::Predicted {
                    coordinate,
                    outcome,
                },
            );
        });
    }

    pub fn weather(&self, dashboard: &Dashboard, coordinate: Coordinate) {
        let api = dashboard.api();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = Dashboard::fetch_weather(api.as_ref(), coordinate).await;
            Self::send(&sender, DashboardEvent::Weather(outcome));
        });
    }

    pub fn health(&self, dashboard: &Dashboard) {
        let api = dashboard.api();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = api.health().await;
            Self::send(&sender, DashboardEvent::Health(outcome));
        });
    }
}

/// Applies one background result to the app, starting follow-up work.
pub fn apply_event(app: &mut App, spawner: &TaskSpawner, event: DashboardEvent) {
    match event {
        DashboardEvent::Located(outcome) => {
            app.locating = false;
            if let Some(coordinate) = app.dashboard.apply_location(outcome, &mut app.view) {
                start_prediction(app, spawner, coordinate, Overrides::new());
            }
        }
        DashboardEvent::Predicted {
            coordinate,
            outcome,
        } => {
            app.pending_predictions = app.pending_predictions.saturating_sub(1);
            if app
                .dashboard
                .apply_prediction(coordinate, outcome, &mut app.view)
            {
                spawner.weather(&app.dashboard, coordinate);
            }
        }
        DashboardEvent::Weather(outcome) => Dashboard::apply_weather(outcome, &mut app.view),
        DashboardEvent::Health(outcome) => {
            let online = match outcome {
                Ok(online) => online,
                Err(e) => {
                    warn!("backend health check failed: {e}");
                    false
                }
            };
            info!(online, "backend health");
            app.backend_online = Some(online);
        }
    }
}

fn start_prediction(app: &mut App, spawner: &TaskSpawner, coordinate: Coordinate, overrides: Overrides) {
    app.pending_predictions += 1;
    spawner.predict(&app.dashboard, coordinate, overrides);
}

/// Timer, refresh key and form submission all end up here. Without a
/// resolved location there is nothing to predict for.
pub fn request_prediction(app: &mut App, spawner: &TaskSpawner, overrides: Overrides) -> bool {
    let Some(coordinate) = app.dashboard.coordinate() else {
        debug!("no location yet, skipping prediction");
        return false;
    };
    start_prediction(app, spawner, coordinate, overrides);
    true
}

fn handle_action(app: &mut App, spawner: &TaskSpawner, action: UserAction) {
    let overrides = match action {
        UserAction::Refresh => Overrides::new(),
        UserAction::Submit(overrides) => overrides,
    };
    if !request_prediction(app, spawner, overrides) {
        app.push_log("Location not resolved yet; nothing to predict for.");
    }
}

/// Run the dashboard without a terminal UI: one location, one prediction,
/// one weather fetch, then print.
pub async fn run_headless(
    mut dashboard: Dashboard,
    resolver: &LocationResolver,
    json: bool,
) -> Result<()> {
    let backend_online = match dashboard.api().health().await {
        Ok(online) => online,
        Err(e) => {
            warn!("backend health check failed: {e}");
            false
        }
    };

    let mut view = ViewState::new();
    dashboard.boot(resolver, &mut view).await;

    if json {
        render_headless_json(&dashboard, &view, backend_online)?;
    } else {
        render_headless_text(&dashboard, &view, backend_online);
    }

    Ok(())
}

fn render_headless_text(dashboard: &Dashboard, view: &ViewState, backend_online: bool) {
    println!("\nDisaster Risk Dashboard");
    println!("=======================");
    println!("Backend: {}", if backend_online { "online" } else { "offline" });
    println!("{}", view.status);

    let Some(coordinate) = dashboard.coordinate() else {
        return;
    };
    println!("Coordinate: {coordinate}");

    if let Some(badge) = &view.badge {
        println!("\n{}", badge.text);
    }
    if let Some(label) = &view.disaster_type {
        println!("Type: {label}");
    }
    if let Some(advice) = &view.advice {
        println!("Advice: {advice}");
    }

    if let Some(weather) = &view.weather {
        println!("\nWeather:");
        for line in weather.lines() {
            println!("- {line}");
        }
    }
}

fn render_headless_json(dashboard: &Dashboard, view: &ViewState, backend_online: bool) -> Result<()> {
    let snapshot = HeadlessSnapshot {
        backend_online,
        coordinate: dashboard.coordinate(),
        view,
        history: dashboard.history(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("{json}");
    Ok(())
}

#[derive(serde::Serialize)]
struct HeadlessSnapshot<'a> {
    backend_online: bool,
    coordinate: Option<Coordinate>,
    view: &'a ViewState,
    history: &'a crate::domain::RiskHistory,
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    resolver: LocationResolver,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let (spawner, mut events) = TaskSpawner::channel();

    app.view.status = "Detecting location...".to_string();
    app.locating = true;
    spawner.health(&app.dashboard);
    spawner.locate(resolver);

    loop {
        // Update animations and drain log lines
        app.update();

        // Draw the UI with better error context
        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = handle_input(app, key.code) {
                        handle_action(app, &spawner, action);
                    }
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(_) | Err(_) => {
                    // Ignore non-key events
                }
            }
        }

        // Apply finished background work
        while let Ok(event) = events.try_recv() {
            apply_event(app, &spawner, event);
        }

        if app.refresh_due() {
            request_prediction(app, &spawner, Overrides::new());
        }

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::test_app;
    use crate::domain::Severity;
    use crate::location::LocationSource;

    fn flood() -> Prediction {
        Prediction {
            probability: 0.82,
            severity: Severity::Extreme,
            color: "#ff0000".to_string(),
            advice: "Evacuate".to_string(),
            predicted_disaster: Some("flood".to_string()),
        }
    }

    #[tokio::test]
    async fn test_located_event_starts_prediction() {
        let mut app = test_app();
        let (spawner, _events) = TaskSpawner::channel();

        apply_event(
            &mut app,
            &spawner,
            DashboardEvent::Located(Ok(ResolvedLocation {
                coordinate: Coordinate::new(37.7, -122.4),
                source: LocationSource::Gps,
            })),
        );

        assert_eq!(app.dashboard.coordinate(), Some(Coordinate::new(37.7, -122.4)));
        assert_eq!(app.pending_predictions, 1);
        assert_eq!(app.view.status, "Location (GPS): 37.7000, -122.4000");
    }

    #[tokio::test]
    async fn test_failed_location_stays_dormant() {
        let mut app = test_app();
        let (spawner, _events) = TaskSpawner::channel();
        app.locating = true;

        apply_event(
            &mut app,
            &spawner,
            DashboardEvent::Located(Err(DashboardError::LocationUnavailable)),
        );

        assert!(!app.locating);
        assert_eq!(app.pending_predictions, 0);
        assert!(!request_prediction(&mut app, &spawner, Overrides::new()));
        assert_eq!(app.view.status, "Unable to detect location.");
    }

    #[tokio::test]
    async fn test_prediction_event_renders_and_counts_down() {
        let mut app = test_app();
        let (spawner, _events) = TaskSpawner::channel();
        let coordinate = Coordinate::new(37.7, -122.4);
        app.pending_predictions = 2;

        apply_event(
            &mut app,
            &spawner,
            DashboardEvent::Predicted {
                coordinate,
                outcome: Ok(flood()),
            },
        );
        apply_event(
            &mut app,
            &spawner,
            DashboardEvent::Predicted {
                coordinate,
                outcome: Err(DashboardError::PredictionFailed("late".to_string())),
            },
        );

        assert_eq!(app.pending_predictions, 0);
        assert_eq!(
            app.view.badge.as_ref().map(|b| b.text.as_str()),
            Some("Risk unavailable")
        );
        assert_eq!(app.dashboard.history().len(), 1);
    }

    #[tokio::test]
    async fn test_health_event() {
        let mut app = test_app();
        let (spawner, _events) = TaskSpawner::channel();
        apply_event(
            &mut app,
            &spawner,
            DashboardEvent::Health(Err(DashboardError::LocationUnavailable)),
        );
        assert_eq!(app.backend_online, Some(false));
    }
}
