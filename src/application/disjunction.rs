//! Big-M reformulation of disjunctions.
//!
//! For a disjunction over disjuncts `D_1..D_k`, one binary indicator `y_i`
//! is added per disjunct together with `Σ y_i = 1`. Every constraint of
//! `D_i` is normalised to `g(x) <= 0` and relaxed to
//!
//! ```text
//! g(x) <= M · (1 - y_i)
//! ```
//!
//! where `M` is the supremum of `g` over the declared variable bounds, so
//! the relaxed row is vacuous when `y_i = 0` and exact when `y_i = 1`.
//! Equalities are split into two inequalities, each with its own `M`.

use tracing::{debug, info};

use crate::application::linear::{linearize, LinearExpr};
use crate::application::units::UnitChecker;
use crate::domain::{
    Constraint, ConstraintSense, Expr, Model, Quantity, TransformedDisjunction, Variable,
};
use crate::error::{ConfigError, ModelError, Result};

/// Largest value `form` can take within the declared bounds, floored at zero.
///
/// # Errors
///
/// Returns the name of the first variable whose bound in the direction that
/// increases `form` is missing or not finite.
pub fn big_m(form: &LinearExpr, variables: &[Variable]) -> std::result::Result<f64, String> {
    let mut sup = form.constant;
    for (id, coefficient) in &form.terms {
        if *coefficient == 0.0 {
            continue;
        }
        let var = &variables[id.index()];
        let bound = if *coefficient > 0.0 { var.upper } else { var.lower };
        match bound {
            Some(b) if b.is_finite() => sup += coefficient * b,
            _ => return Err(var.name.clone()),
        }
    }
    Ok(sup.max(0.0))
}

pub struct DisjunctionTransformer;

impl DisjunctionTransformer {
    /// Replace every pending disjunction in `model` by indicator variables and
    /// relaxed linear constraints.
    ///
    /// The rewrite is staged on a copy and committed only when every
    /// disjunction relaxed cleanly; on error `model` is left untouched.
    pub fn transform(model: &mut Model) -> Result<()> {
        let mut staged = model.clone();
        Self::transform_in_place(&mut staged)?;
        *model = staged;
        Ok(())
    }

    fn transform_in_place(model: &mut Model) -> Result<()> {
        for disjunction in model.take_disjunctions() {
            if disjunction.disjuncts.is_empty() {
                return Err(ModelError::EmptyDisjunction {
                    name: disjunction.name,
                }
                .into());
            }

            let mut record = TransformedDisjunction {
                name: disjunction.name.clone(),
                indicators: Vec::with_capacity(disjunction.disjuncts.len()),
                big_m: Vec::new(),
            };

            for disjunct in &disjunction.disjuncts {
                let indicator = model.add_binary(format!("{}.{}.indicator", disjunction.name, disjunct.name));
                record.indicators.push((disjunct.name.clone(), indicator));

                for constraint in &disjunct.constraints {
                    let location = format!("{}.{}", disjunct.name, constraint.name);
                    for (suffix, relaxed_sense) in split(constraint.sense) {
                        let name = format!("{location}{suffix}");
                        let m = relax(model, constraint, relaxed_sense, &name, indicator)?;
                        record.big_m.push((name, m));
                    }
                }
            }

            model.add_constraint(Constraint::eq(
                format!("{}.exactly_one", disjunction.name),
                Expr::sum(record.indicators.iter().map(|(_, id)| *id)),
                Quantity::dimensionless(1.0),
            ));

            info!(
                disjunction = %record.name,
                disjuncts = record.indicators.len(),
                relaxed = record.big_m.len(),
                "Applied big-M reformulation"
            );
            model.record_transformation(record);
        }
        Ok(())
    }
}

/// Inequalities a constraint of `sense` expands into.
fn split(sense: ConstraintSense) -> Vec<(&'static str, ConstraintSense)> {
    match sense {
        ConstraintSense::Equal => vec![
            (".upper", ConstraintSense::LessEqual),
            (".lower", ConstraintSense::GreaterEqual),
        ],
        other => vec![("", other)],
    }
}

/// Add the relaxed form of `constraint` (read with `sense`) controlled by
/// `indicator` and return the big-M used.
fn relax(
    model: &mut Model,
    constraint: &Constraint,
    sense: ConstraintSense,
    name: &str,
    indicator: crate::domain::VarId,
) -> Result<f64> {
    let lhs = linearize(&constraint.lhs, model, name)?;
    let rhs = linearize(&constraint.rhs, model, name)?;
    // Violation measure: positive exactly when the constraint is violated.
    let violation = match sense {
        ConstraintSense::GreaterEqual => rhs.minus(&lhs),
        _ => lhs.minus(&rhs),
    };

    let m = big_m(&violation, model.variables()).map_err(|variable| ConfigError::UnboundedDisjunct {
        constraint: name.to_string(),
        variable,
    })?;

    let dimension = UnitChecker::dimension(model, &constraint.lhs, name)?;
    let m_param = model.add_parameter(format!("{name}.big_m"), m, dimension);
    let slack = m_param * (Quantity::dimensionless(1.0) - indicator);

    let relaxed = match sense {
        ConstraintSense::GreaterEqual => Constraint::geq(
            name,
            constraint.lhs.clone(),
            constraint.rhs.clone() - slack,
        ),
        _ => Constraint::leq(name, constraint.lhs.clone(), constraint.rhs.clone() + slack),
    };

    debug!(constraint = %name, big_m = m, "Relaxed disjunct constraint");
    model.add_constraint(relaxed);
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimension, Disjunct, Disjunction, VariableKind};
    use crate::error::Error;

    fn bounded(model: &mut Model, name: &str, lower: Option<f64>, upper: Option<f64>) -> crate::domain::VarId {
        model.add_variable(name, VariableKind::Continuous, lower, upper, Dimension::ENERGY)
    }

    #[test]
    fn big_m_is_supremum_over_bounds() {
        let mut model = Model::new("t");
        let solar = bounded(&mut model, "solar", Some(1.0), Some(100.0));
        let battery = bounded(&mut model, "battery", Some(0.0), Some(4.0));

        // battery - solar + 10 <= 0
        let mut form = LinearExpr::constant(10.0);
        form.add_term(battery, 1.0);
        form.add_term(solar, -1.0);
        assert_eq!(big_m(&form, model.variables()), Ok(13.0));

        // 10 - solar <= 0
        let mut form = LinearExpr::constant(10.0);
        form.add_term(solar, -1.0);
        assert_eq!(big_m(&form, model.variables()), Ok(9.0));
    }

    #[test]
    fn big_m_is_never_negative() {
        let mut model = Model::new("t");
        let battery = bounded(&mut model, "battery", Some(0.0), Some(4.0));
        let mut form = LinearExpr::default();
        form.add_term(battery, -1.0);
        assert_eq!(big_m(&form, model.variables()), Ok(0.0));
    }

    #[test]
    fn big_m_requires_finite_bound() {
        let mut model = Model::new("t");
        let grid = bounded(&mut model, "grid", Some(0.0), None);
        let mut form = LinearExpr::default();
        form.add_term(grid, 1.0);
        assert_eq!(big_m(&form, model.variables()), Err("grid".to_string()));
    }

    #[test]
    fn transform_adds_indicators_and_relaxed_rows() {
        let mut model = Model::new("t");
        let x = bounded(&mut model, "x", Some(0.0), Some(4.0));
        model.add_disjunction(Disjunction::new(
            "rule",
            vec![
                Disjunct::new("small", vec![Constraint::leq("cap", x, Quantity::energy(1.0))]),
                Disjunct::new("zero", vec![Constraint::eq("off", x, Quantity::energy(0.0))]),
            ],
        ));

        DisjunctionTransformer::transform(&mut model).unwrap();

        assert!(model.disjunctions().is_empty());
        let record = &model.transformed_disjunctions()[0];
        assert_eq!(record.indicators.len(), 2);
        assert_eq!(
            record.big_m,
            vec![
                ("small.cap".to_string(), 3.0),
                ("zero.off.upper".to_string(), 4.0),
                ("zero.off.lower".to_string(), 0.0),
            ]
        );

        let names: Vec<&str> = model.constraints().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["small.cap", "zero.off.upper", "zero.off.lower", "rule.exactly_one"]);
        assert!(UnitChecker::check(&model).is_ok());
    }

    #[test]
    fn unbounded_disjunct_is_a_configuration_error() {
        let mut model = Model::new("t");
        let grid = bounded(&mut model, "grid", Some(0.0), None);
        model.add_disjunction(Disjunction::new(
            "rule",
            vec![Disjunct::new("capped", vec![Constraint::leq("limit", grid, Quantity::energy(5.0))])],
        ));

        let err = DisjunctionTransformer::transform(&mut model).unwrap_err();
        match err {
            Error::Config(ConfigError::UnboundedDisjunct { constraint, variable }) => {
                assert_eq!(constraint, "capped.limit");
                assert_eq!(variable, "grid");
            }
            other => panic!("expected unbounded disjunct error, got {other}"),
        }
    }

    #[test]
    fn failed_transform_leaves_model_untouched() {
        let mut model = Model::new("t");
        let x = bounded(&mut model, "x", Some(0.0), Some(4.0));
        let grid = bounded(&mut model, "grid", Some(0.0), None);
        model.add_disjunction(Disjunction::new(
            "rule",
            vec![
                Disjunct::new("small", vec![Constraint::leq("cap", x, Quantity::energy(1.0))]),
                Disjunct::new("capped", vec![Constraint::leq("limit", grid, Quantity::energy(5.0))]),
            ],
        ));

        assert!(DisjunctionTransformer::transform(&mut model).is_err());

        assert_eq!(model.disjunctions().len(), 1);
        assert!(model.constraints().is_empty());
        assert!(model.parameters().is_empty());
        assert_eq!(model.variables().len(), 2);
        assert!(model.transformed_disjunctions().is_empty());
    }
}
