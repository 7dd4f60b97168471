use crate::domain::Overrides;

/// Sensor fields the backend understands, with their labels.
pub const SENSOR_FIELDS: &[(&str, &str)] = &[
    ("rainfall_mm", "Rainfall (mm)"),
    ("seismic_richter", "Seismic (Richter)"),
    ("river_level_m", "River level (m)"),
    ("soil_moisture_pct", "Soil moisture (%)"),
    ("sat_cloud_pct", "Satellite cloud (%)"),
    ("wind_speed_kmh", "Wind speed (km/h)"),
    ("temperature_c", "Temperature (°C)"),
    ("slope_deg", "Slope (deg)"),
    ("vegetation_dryness", "Vegetation dryness"),
];

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// The manual sensor-reading form.
#[derive(Debug, Clone)]
pub struct ManualForm {
    pub fields: Vec<FormField>,
    pub selected: usize,
    pub open: bool,
}

impl ManualForm {
    pub fn new() -> Self {
        Self {
            fields: SENSOR_FIELDS
                .iter()
                .map(|&(key, label)| FormField {
                    key,
                    label,
                    value: String::new(),
                })
                .collect(),
            selected: 0,
            open: false,
        }
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.value.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.value.pop();
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }

    /// Every field, empty ones included, as entered.
    pub fn overrides(&self) -> Overrides {
        self.fields
            .iter()
            .map(|field| (field.key.to_string(), field.value.clone()))
            .collect()
    }
}

impl Default for ManualForm {
    fn default() -> Self {
        Self::new()
    }
}
