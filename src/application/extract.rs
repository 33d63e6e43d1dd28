//! Reading the sizing decision out of a solved model.

use crate::application::builder::{
    BATTERY_CAPACITY, OFF_PEAK_GRID_USAGE, PEAK_GRID_CONSUMPTION, SOLAR_CAPACITY, SOLAR_SIZE_CHOICE,
};
use crate::domain::{Model, SolveStatus, Summary};
use crate::error::ExtractionError;

/// Solver noise below this is reported as zero.
const ZERO_TOLERANCE: f64 = 1e-9;

pub struct ResultExtractor;

impl ResultExtractor {
    /// Copy the four headline values out of a solved model.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::NotSolved`] unless the model status is
    /// [`SolveStatus::Solved`].
    pub fn extract(model: &Model) -> Result<Summary, ExtractionError> {
        ensure_solved(model)?;
        Ok(Summary {
            solar_capacity: read(model, SOLAR_CAPACITY)?,
            battery_capacity: read(model, BATTERY_CAPACITY)?,
            off_peak_grid_usage: read(model, OFF_PEAK_GRID_USAGE)?,
            peak_grid_consumption: read(model, PEAK_GRID_CONSUMPTION)?,
        })
    }

    /// Catalogue size whose flag is set in the solution.
    ///
    /// # Errors
    ///
    /// Same precondition as [`Self::extract`].
    pub fn selected_size(model: &Model) -> Result<Option<i64>, ExtractionError> {
        ensure_solved(model)?;
        let Some(choice) = model.choice(SOLAR_SIZE_CHOICE) else {
            return Ok(None);
        };
        Ok(choice
            .options
            .iter()
            .zip(&choice.flags)
            .find(|(_, flag)| model.value(**flag).is_some_and(|v| v > 0.5))
            .map(|(size, _)| *size))
    }
}

fn ensure_solved(model: &Model) -> Result<(), ExtractionError> {
    match model.status() {
        SolveStatus::Solved => Ok(()),
        status => Err(ExtractionError::NotSolved { status }),
    }
}

fn read(model: &Model, name: &'static str) -> Result<f64, ExtractionError> {
    let value = model
        .find_variable(name)
        .and_then(|id| model.value(id))
        .ok_or(ExtractionError::MissingVariable { name })?;
    Ok(if value.abs() < ZERO_TOLERANCE { 0.0 } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::ModelBuilder;
    use crate::domain::{ModelSolution, ParameterSet};

    fn solved_default() -> Model {
        let mut model = ModelBuilder::build(&ParameterSet::default()).unwrap();
        let mut values = vec![0.0; model.variables().len()];
        for (name, value) in [
            (SOLAR_CAPACITY, 12.0),
            (BATTERY_CAPACITY, 2.0),
            (OFF_PEAK_GRID_USAGE, 18.0),
            (PEAK_GRID_CONSUMPTION, -1e-12),
            ("solar_size_flag[12]", 1.0),
        ] {
            values[model.find_variable(name).unwrap().index()] = value;
        }
        model.record_solution(ModelSolution {
            solver: "test",
            objective: 8.904,
            values,
        });
        model
    }

    #[test]
    fn unsolved_model_is_rejected_with_status() {
        let model = ModelBuilder::build(&ParameterSet::default()).unwrap();
        assert_eq!(
            ResultExtractor::extract(&model),
            Err(ExtractionError::NotSolved {
                status: SolveStatus::NotSolved
            })
        );
    }

    #[test]
    fn infeasible_model_is_rejected_with_status() {
        let mut model = ModelBuilder::build(&ParameterSet::default()).unwrap();
        model.record_status(SolveStatus::Infeasible, Some("test"));
        let err = ResultExtractor::extract(&model).unwrap_err();
        assert_eq!(err.to_string(), "cannot extract results: model status is infeasible");
    }

    #[test]
    fn reads_values_and_clamps_noise() {
        let summary = ResultExtractor::extract(&solved_default()).unwrap();
        assert_eq!(
            summary,
            Summary {
                solar_capacity: 12.0,
                battery_capacity: 2.0,
                off_peak_grid_usage: 18.0,
                peak_grid_consumption: 0.0,
            }
        );
    }

    #[test]
    fn reports_selected_catalogue_size() {
        assert_eq!(ResultExtractor::selected_size(&solved_default()), Ok(Some(12)));
    }
}
