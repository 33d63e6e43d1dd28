//! Construction of the solar/battery sizing model from a parameter set.

use tracing::debug;

use crate::domain::{
    Constraint, Dimension, Disjunct, Disjunction, Model, ParameterSet, Quantity, VariableKind,
};
use crate::error::Result;

/// Installed solar capacity (kWh), restricted to one catalogue size.
pub const SOLAR_CAPACITY: &str = "solar_capacity";
/// Unit cost (USD/kWh) of the selected installation.
pub const SOLAR_COST: &str = "solar_cost";
pub const PEAK_GRID_CONSUMPTION: &str = "peak_grid_consumption";
pub const OFF_PEAK_GRID_USAGE: &str = "off_peak_grid_usage";
pub const BATTERY_CAPACITY: &str = "battery_capacity";
/// Choice set over the catalogue of installation sizes.
pub const SOLAR_SIZE_CHOICE: &str = "solar_size";
/// Disjunction tying battery sizing to solar sufficiency.
pub const BATTERY_SIZING_RULE: &str = "battery_sizing";
/// Disjunct allowing a battery charged from excess solar.
pub const EXCESS_SOLAR: &str = "excess_solar";
/// Disjunct forcing the battery to zero.
pub const NO_BATTERY: &str = "no_battery";

const SOLAR_CAPACITY_BOUNDS: (f64, f64) = (1.0, 100.0);
const BATTERY_CAPACITY_BOUNDS: (f64, f64) = (0.0, 4.0);

pub struct ModelBuilder;

impl ModelBuilder {
    /// Build the unsolved model, including the untransformed battery-sizing
    /// disjunction.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `params` has an empty or
    /// non-positive size table or a non-positive price or load.
    pub fn build(params: &ParameterSet) -> Result<Model> {
        params.validate()?;

        let mut model = Model::new("solar_battery_sizing");

        let peak_load = model.add_parameter("peak_load", params.peak_consumption, Dimension::ENERGY);
        let off_peak_load =
            model.add_parameter("off_peak_load", params.off_peak_consumption, Dimension::ENERGY);
        let peak_grid_price =
            model.add_parameter("peak_grid_price", params.peak_price, Dimension::CURRENCY_PER_ENERGY);
        let off_peak_grid_price = model.add_parameter(
            "off_peak_grid_price",
            params.off_peak_price,
            Dimension::CURRENCY_PER_ENERGY,
        );
        let battery_cost_per_kw = model.add_parameter(
            "battery_cost_per_kw",
            params.battery_cost_per_kw,
            Dimension::CURRENCY_PER_ENERGY,
        );

        let solar_capacity = model.add_variable(
            SOLAR_CAPACITY,
            VariableKind::Continuous,
            Some(SOLAR_CAPACITY_BOUNDS.0),
            Some(SOLAR_CAPACITY_BOUNDS.1),
            Dimension::ENERGY,
        );
        let solar_cost = model.add_variable(
            SOLAR_COST,
            VariableKind::Continuous,
            Some(0.0),
            None,
            Dimension::CURRENCY_PER_ENERGY,
        );
        let peak_grid = model.add_variable(
            PEAK_GRID_CONSUMPTION,
            VariableKind::Continuous,
            Some(0.0),
            None,
            Dimension::ENERGY,
        );
        let off_peak_grid = model.add_variable(
            OFF_PEAK_GRID_USAGE,
            VariableKind::Continuous,
            Some(0.0),
            None,
            Dimension::ENERGY,
        );
        let battery = model.add_variable(
            BATTERY_CAPACITY,
            VariableKind::Continuous,
            Some(BATTERY_CAPACITY_BOUNDS.0),
            Some(BATTERY_CAPACITY_BOUNDS.1),
            Dimension::ENERGY,
        );

        let table = &params.solar_installation_sizes;
        let sizes: Vec<i64> = table.sizes().collect();
        let unit_costs: Vec<Quantity> = table
            .iter()
            .map(|(_, cost)| Quantity::currency_per_energy(cost))
            .collect();
        let capacities: Vec<Quantity> = table
            .iter()
            .map(|(size, _)| Quantity::energy(size as f64))
            .collect();
        model.add_choice(
            SOLAR_SIZE_CHOICE,
            sizes,
            vec![(solar_cost, unit_costs), (solar_capacity, capacities)],
        );

        model.add_constraint(Constraint::leq(
            "off_peak_coverage",
            off_peak_load,
            off_peak_grid + battery,
        ));
        model.add_constraint(Constraint::leq(
            "peak_coverage",
            peak_load,
            peak_grid + solar_capacity,
        ));

        model.set_objective(
            "minimize_cost",
            peak_grid_price * peak_grid
                + off_peak_grid_price * off_peak_grid
                + solar_cost * solar_capacity
                + battery_cost_per_kw * battery,
            Dimension::CURRENCY,
        );

        model.add_disjunction(Disjunction::new(
            BATTERY_SIZING_RULE,
            vec![
                Disjunct::new(
                    EXCESS_SOLAR,
                    vec![
                        Constraint::geq("solar_covers_peak", solar_capacity, peak_load),
                        Constraint::leq(
                            "battery_within_excess_solar",
                            battery,
                            solar_capacity - peak_load,
                        ),
                    ],
                ),
                Disjunct::new(
                    NO_BATTERY,
                    vec![Constraint::eq("battery_zero", battery, Quantity::energy(0.0))],
                ),
            ],
        ));

        debug!(
            sizes = table.len(),
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            "Built sizing model"
        );

        Ok(model)
    }
}
