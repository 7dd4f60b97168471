use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

use crate::domain::{Coordinate, Overrides};

pub fn current_utc_month() -> u32 {
    Utc::now().month()
}

/// Builds the `/api/predict` body. Overrides are inserted last and win on
/// key clashes, so an operator can replace `lat`, `lon` or `month` too.
pub fn build_payload(coordinate: Coordinate, month: u32, overrides: &Overrides) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("lat".to_string(), Value::from(coordinate.latitude));
    payload.insert("lon".to_string(), Value::from(coordinate.longitude));
    payload.insert("month".to_string(), Value::from(month));

    for (key, value) in overrides {
        payload.insert(key.clone(), Value::String(value.clone()));
    }

    payload
}
