//! Plain result structure read out of a solved model.

use serde::Serialize;

/// Key outputs of a solved sizing model. All values are non-negative kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub solar_capacity: f64,
    pub battery_capacity: f64,
    pub off_peak_grid_usage: f64,
    pub peak_grid_consumption: f64,
}
