mod loop_handler;

pub use loop_handler::{
    apply_event, request_prediction, run, run_headless, DashboardEvent, TaskSpawner,
};
