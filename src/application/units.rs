//! Static dimensional analysis of a model.
//!
//! Every leaf of an expression carries a [`Dimension`]. Sums require equal
//! dimensions, products combine them, and both sides of a constraint must
//! agree. The objective must also match its declared dimension. The pass is
//! read-only and reports every offending expression, not just the first.

use tracing::{debug, warn};

use crate::domain::{Constraint, Dimension, Expr, Model};
use crate::error::{UnitMismatch, UnitMismatchError};

pub struct UnitChecker;

impl UnitChecker {
    /// Verify every constraint, pending disjunct and the objective.
    pub fn check(model: &Model) -> Result<(), UnitMismatchError> {
        let mut mismatches = Vec::new();

        for constraint in model.constraints() {
            check_constraint(model, constraint, &constraint.name, &mut mismatches);
        }

        for disjunction in model.disjunctions() {
            for disjunct in &disjunction.disjuncts {
                for constraint in &disjunct.constraints {
                    let location = format!("{}.{}.{}", disjunction.name, disjunct.name, constraint.name);
                    check_constraint(model, constraint, &location, &mut mismatches);
                }
            }
        }

        if let Some(objective) = model.objective() {
            if let Some(found) = dimension_of(model, &objective.expr, &objective.name, &mut mismatches) {
                if found != objective.dimension {
                    mismatches.push(UnitMismatch {
                        location: objective.name.clone(),
                        expression: objective.expr.display(model).to_string(),
                        detail: format!("objective is {found}, declared {}", objective.dimension),
                    });
                }
            }
        }

        if mismatches.is_empty() {
            debug!(model = %model.name, "Unit check passed");
            Ok(())
        } else {
            warn!(model = %model.name, count = mismatches.len(), "Unit check failed");
            Err(UnitMismatchError { mismatches })
        }
    }

    /// Dimension of a single expression, or the mismatches that prevent one.
    pub fn dimension(model: &Model, expr: &Expr, location: &str) -> Result<Dimension, UnitMismatchError> {
        let mut mismatches = Vec::new();
        match dimension_of(model, expr, location, &mut mismatches) {
            Some(dimension) if mismatches.is_empty() => Ok(dimension),
            _ => Err(UnitMismatchError { mismatches }),
        }
    }
}

fn check_constraint(model: &Model, constraint: &Constraint, location: &str, out: &mut Vec<UnitMismatch>) {
    let lhs = dimension_of(model, &constraint.lhs, location, out);
    let rhs = dimension_of(model, &constraint.rhs, location, out);
    if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
        if lhs != rhs {
            out.push(UnitMismatch {
                location: location.to_string(),
                expression: format!(
                    "{} {} {}",
                    constraint.lhs.display(model),
                    constraint.sense.symbol(),
                    constraint.rhs.display(model)
                ),
                detail: format!("left side is {lhs}, right side is {rhs}"),
            });
        }
    }
}

/// Walk `expr` bottom-up. Returns `None` once a mismatch has been recorded
/// below, so each inconsistency is reported at the innermost node only.
fn dimension_of(model: &Model, expr: &Expr, location: &str, out: &mut Vec<UnitMismatch>) -> Option<Dimension> {
    match expr {
        Expr::Constant(q) => Some(q.dimension),
        Expr::Parameter(id) => Some(model.parameter(*id).dimension),
        Expr::Variable(id) => Some(model.variable(*id).dimension),
        Expr::Negate(inner) => dimension_of(model, inner, location, out),
        Expr::Product(lhs, rhs) => {
            let l = dimension_of(model, lhs, location, out);
            let r = dimension_of(model, rhs, location, out);
            Some(l? * r?)
        }
        Expr::Sum(terms) if terms.is_empty() => {
            out.push(UnitMismatch {
                location: location.to_string(),
                expression: expr.display(model).to_string(),
                detail: "sums no terms, so it has no dimension".to_string(),
            });
            None
        }
        Expr::Sum(terms) => {
            let dims: Vec<Option<Dimension>> =
                terms.iter().map(|t| dimension_of(model, t, location, out)).collect();
            let dims: Vec<Dimension> = dims.into_iter().collect::<Option<_>>()?;
            let first = dims[0];
            if dims.iter().all(|d| *d == first) {
                Some(first)
            } else {
                let found: Vec<String> = dims.iter().map(ToString::to_string).collect();
                out.push(UnitMismatch {
                    location: location.to_string(),
                    expression: expr.display(model).to_string(),
                    detail: format!("adds terms of different dimensions: {}", found.join(", ")),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, Quantity, VariableKind};

    fn model_with_vars() -> (Model, crate::domain::VarId, crate::domain::VarId) {
        let mut model = Model::new("t");
        let energy = model.add_variable("grid", VariableKind::Continuous, Some(0.0), None, Dimension::ENERGY);
        let price = model.add_variable(
            "unit_cost",
            VariableKind::Continuous,
            Some(0.0),
            None,
            Dimension::CURRENCY_PER_ENERGY,
        );
        (model, energy, price)
    }

    #[test]
    fn consistent_model_passes() {
        let (mut model, energy, price) = model_with_vars();
        let tariff = model.add_parameter("tariff", 0.4, Dimension::CURRENCY_PER_ENERGY);
        model.add_constraint(Constraint::geq("cover", energy, Quantity::energy(3.0)));
        model.set_objective("cost", tariff * energy + price * energy, Dimension::CURRENCY);
        assert!(UnitChecker::check(&model).is_ok());
    }

    #[test]
    fn currency_plus_energy_is_rejected() {
        let (mut model, energy, _) = model_with_vars();
        let fee = model.add_parameter("fee", 2.0, Dimension::CURRENCY);
        model.add_constraint(Constraint::leq("broken", fee + energy, Quantity::currency(10.0)));

        let err = UnitChecker::check(&model).unwrap_err();
        assert_eq!(err.mismatches.len(), 1);
        let mismatch = &err.mismatches[0];
        assert_eq!(mismatch.location, "broken");
        assert_eq!(mismatch.expression, "fee + grid");
        assert!(mismatch.detail.contains("USD"));
        assert!(mismatch.detail.contains("kWh"));
    }

    #[test]
    fn power_is_not_energy() {
        let (mut model, energy, _) = model_with_vars();
        let rating = model.add_parameter("rating", 5.0, Dimension::POWER);
        model.add_constraint(Constraint::leq("rating_limit", energy, rating));

        let err = UnitChecker::check(&model).unwrap_err();
        assert!(err.mismatches[0].detail.contains("left side is kWh, right side is kW"));
    }

    #[test]
    fn empty_sum_is_reported() {
        let (mut model, energy, _) = model_with_vars();
        model.add_constraint(Constraint::leq("nothing", Expr::sum(Vec::<Expr>::new()), energy));

        let err = UnitChecker::check(&model).unwrap_err();
        assert_eq!(err.mismatches.len(), 1);
        assert_eq!(err.mismatches[0].location, "nothing");
        assert!(err.mismatches[0].detail.contains("no terms"));

        let err = UnitChecker::dimension(&model, &Expr::sum(Vec::<Expr>::new()), "empty").unwrap_err();
        assert_eq!(err.mismatches.len(), 1);
    }

    #[test]
    fn objective_must_have_declared_dimension() {
        let (mut model, energy, _) = model_with_vars();
        model.set_objective("cost", Expr::from(energy), Dimension::CURRENCY);
        let err = UnitChecker::check(&model).unwrap_err();
        assert_eq!(err.mismatches[0].location, "cost");
    }

    #[test]
    fn every_mismatch_is_reported() {
        let (mut model, energy, price) = model_with_vars();
        model.add_constraint(Constraint::leq("first", energy + price, Quantity::energy(1.0)));
        model.add_constraint(Constraint::eq("second", price, energy));
        let err = UnitChecker::check(&model).unwrap_err();
        assert_eq!(err.mismatches.len(), 2);
    }
}
