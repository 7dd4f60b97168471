use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::app::form::ManualForm;
use crate::dashboard::{Dashboard, ViewState};
use crate::domain::Overrides;

/// Lines kept in the log pane.
pub const LOG_CAPACITY: usize = 50;

/// Work the event loop has to start on behalf of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Refresh,
    Submit(Overrides),
}

pub struct App {
    pub running: bool,
    pub dashboard: Dashboard,
    pub view: ViewState,
    pub form: ManualForm,
    pub show_help: bool,
    pub animation_counter: f64,
    pub last_frame: Instant,
    pub refresh_interval: Duration,
    pub last_refresh: Instant,
    pub locating: bool,
    pub pending_predictions: usize,
    pub backend_online: Option<bool>,
    pub logs: VecDeque<String>,
    log_receiver: Option<Receiver<String>>,
}

impl App {
    pub fn new(dashboard: Dashboard, refresh_interval: Duration) -> Self {
        Self {
            running: true,
            dashboard,
            view: ViewState::new(),
            form: ManualForm::new(),
            show_help: false,
            animation_counter: 0.0,
            last_frame: Instant::now(),
            refresh_interval,
            last_refresh: Instant::now(),
            locating: false,
            pending_predictions: 0,
            backend_online: None,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            log_receiver: None,
        }
    }

    #[must_use]
    pub fn with_log_receiver(mut self, receiver: Receiver<String>) -> Self {
        self.log_receiver = Some(receiver);
        self
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        // Update animation counter (cycles between 0 and 2*PI)
        self.animation_counter += delta.as_secs_f64() * 4.0;
        if self.animation_counter > 2.0 * std::f64::consts::PI {
            self.animation_counter -= 2.0 * std::f64::consts::PI;
        }

        self.drain_logs();
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > LOG_CAPACITY {
            self.logs.pop_front();
        }
    }

    fn drain_logs(&mut self) {
        let lines: Vec<String> = self
            .log_receiver
            .as_ref()
            .map(|receiver| receiver.try_iter().collect())
            .unwrap_or_default();
        for line in lines {
            self.push_log(line);
        }
    }

    /// True once per refresh interval. The timer keeps ticking before a
    /// location is known; the event loop skips the request in that case.
    pub fn refresh_due(&mut self) -> bool {
        if self.last_refresh.elapsed() < self.refresh_interval {
            return false;
        }
        self.last_refresh = Instant::now();
        true
    }

    pub const fn busy(&self) -> bool {
        self.locating || self.pending_predictions > 0
    }
}
