//! End-to-end sizing run: build, transform, check, solve, extract.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::application::builder::ModelBuilder;
use crate::application::disjunction::DisjunctionTransformer;
use crate::application::extract::ResultExtractor;
use crate::application::runner::SolverRunner;
use crate::application::units::UnitChecker;
use crate::domain::{Model, ParameterSet, SolveStatus, Summary};
use crate::error::Result;

/// Outcome of one optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    pub status: SolveStatus,
    /// Backend that produced `status`.
    pub solver: Option<&'static str>,
    pub objective: Option<f64>,
    /// Catalogue size picked for the solar installation.
    pub selected_size: Option<i64>,
    /// Present only when `status` is solved.
    pub summary: Option<Summary>,
}

pub struct Optimizer {
    runner: Arc<SolverRunner>,
    primary: String,
    fallback: String,
}

impl Optimizer {
    #[must_use]
    pub fn new(runner: Arc<SolverRunner>, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            runner,
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn runner(&self) -> &SolverRunner {
        &self.runner
    }

    /// Build and transform the model for `params` without solving it.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, an underivable big-M or unit mismatches.
    pub fn prepare(params: &ParameterSet) -> Result<Model> {
        let mut model = ModelBuilder::build(params)?;
        DisjunctionTransformer::transform(&mut model)?;
        UnitChecker::check(&model)?;
        Ok(model)
    }

    /// Run the full pipeline for `params`.
    ///
    /// Infeasible, unbounded and timed-out runs return `Ok` with the status
    /// set and no summary.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, unit mismatches, when no solver is
    /// available or when the solver crashes.
    #[instrument(skip_all, fields(primary = %self.primary, fallback = %self.fallback))]
    pub async fn optimize(&self, params: &ParameterSet) -> Result<Optimization> {
        let model = Self::prepare(params)?;
        let (status, model) = self.runner.solve(model, &self.primary, &self.fallback).await?;

        let (summary, selected_size) = if status == SolveStatus::Solved {
            (
                Some(ResultExtractor::extract(&model)?),
                ResultExtractor::selected_size(&model)?,
            )
        } else {
            (None, None)
        };

        let outcome = Optimization {
            status,
            solver: model.solver_used(),
            objective: model.solution().map(|s| s.objective),
            selected_size,
            summary,
        };
        info!(
            status = %outcome.status,
            solver = outcome.solver.unwrap_or("none"),
            objective = outcome.objective,
            "Optimization finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::{BATTERY_SIZING_RULE, SOLAR_SIZE_CHOICE};

    #[test]
    fn prepare_transforms_battery_rule() {
        let model = Optimizer::prepare(&ParameterSet::default()).unwrap();
        assert!(model.disjunctions().is_empty());
        let record = &model.transformed_disjunctions()[0];
        assert_eq!(record.name, BATTERY_SIZING_RULE);
        assert_eq!(record.indicators.len(), 2);
        assert!(record.big_m.iter().all(|(_, m)| *m >= 0.0 && m.is_finite()));
        assert!(model.choice(SOLAR_SIZE_CHOICE).is_some());
        assert_eq!(model.status(), SolveStatus::NotSolved);
    }
}
