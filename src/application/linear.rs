//! Lowering of symbolic models into solver-neutral linear programs.
//!
//! Parameters are substituted by their values and every expression is
//! reduced to `Σ coefficient · variable + constant`. A product of two
//! variable-bearing expressions is only accepted when every pair of
//! variables it multiplies can be written over the flags of one choice set;
//! with exactly one flag active, `flag_i · flag_j` is `flag_i` when
//! `i == j` and zero otherwise, so the expansion is exact.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{ConstraintSense, Expr, Model, VarId, VariableKind};
use crate::error::{ModelError, Result};
use crate::port::solver::{IlpProblem, LinearConstraint, LpProblem, RowSense, VariableBounds};

/// `Σ terms[v] · v + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: BTreeMap<VarId, f64>,
    pub constant: f64,
}

impl LinearExpr {
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    #[must_use]
    pub fn variable(id: VarId) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(id, 1.0);
        Self {
            terms,
            constant: 0.0,
        }
    }

    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.values().all(|c| *c == 0.0)
    }

    pub fn add_term(&mut self, id: VarId, coefficient: f64) {
        *self.terms.entry(id).or_insert(0.0) += coefficient;
    }

    pub fn add_assign(&mut self, other: &Self) {
        for (id, c) in &other.terms {
            self.add_term(*id, *c);
        }
        self.constant += other.constant;
    }

    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        for c in self.terms.values_mut() {
            *c *= factor;
        }
        self.constant *= factor;
        self
    }

    /// `self - other`.
    #[must_use]
    pub fn minus(mut self, other: &Self) -> Self {
        self.add_assign(&other.clone().scaled(-1.0));
        self
    }

    /// Dense coefficient row over `num_vars` columns.
    #[must_use]
    pub fn dense(&self, num_vars: usize) -> Vec<f64> {
        let mut row = vec![0.0; num_vars];
        for (id, c) in &self.terms {
            row[id.index()] += c;
        }
        row
    }
}

/// Reduce `expr` to linear form. `location` names the owning constraint or
/// objective for error messages.
pub fn linearize(expr: &Expr, model: &Model, location: &str) -> Result<LinearExpr> {
    let linear = match expr {
        Expr::Constant(q) => LinearExpr::constant(q.value),
        Expr::Parameter(id) => LinearExpr::constant(model.parameter(*id).value),
        Expr::Variable(id) => LinearExpr::variable(*id),
        Expr::Sum(terms) => {
            let mut acc = LinearExpr::default();
            for term in terms {
                acc.add_assign(&linearize(term, model, location)?);
            }
            acc
        }
        Expr::Negate(inner) => linearize(inner, model, location)?.scaled(-1.0),
        Expr::Product(lhs, rhs) => {
            let a = linearize(lhs, model, location)?;
            let b = linearize(rhs, model, location)?;
            if a.is_constant() {
                b.scaled(a.constant)
            } else if b.is_constant() {
                a.scaled(b.constant)
            } else {
                expand_product(&a, &b, model).ok_or_else(|| ModelError::Nonlinear {
                    location: location.to_string(),
                    expression: expr.display(model).to_string(),
                })?
            }
        }
    };
    Ok(linear)
}

/// `(Σ a_i x_i + a0)(Σ b_j x_j + b0)` with every `x_i · x_j` resolved through
/// a common choice set.
fn expand_product(a: &LinearExpr, b: &LinearExpr, model: &Model) -> Option<LinearExpr> {
    let mut out = LinearExpr::constant(a.constant * b.constant);
    for (x, ca) in &a.terms {
        out.add_term(*x, ca * b.constant);
    }
    for (y, cb) in &b.terms {
        out.add_term(*y, cb * a.constant);
    }

    for (x, ca) in &a.terms {
        for (y, cb) in &b.terms {
            let (flags, weights) = model.choices().iter().find_map(|choice| {
                let rx = choice.representation(*x)?;
                let ry = choice.representation(*y)?;
                let weights: Vec<f64> = rx.iter().zip(&ry).map(|(p, q)| p * q).collect();
                Some((&choice.flags, weights))
            })?;
            debug!(
                lhs = %model.variable(*x).name,
                rhs = %model.variable(*y).name,
                "Expanding product over choice flags"
            );
            for (flag, w) in flags.iter().zip(weights) {
                out.add_term(*flag, ca * cb * w);
            }
        }
    }
    Some(out)
}

/// Lower a transformed model to an [`IlpProblem`] with one column per model
/// variable (column index = [`VarId::index`]).
pub fn compile(model: &Model) -> Result<IlpProblem> {
    if let Some(pending) = model.disjunctions().first() {
        return Err(ModelError::UntransformedDisjunction {
            name: pending.name.clone(),
        }
        .into());
    }
    let objective = model.objective().ok_or_else(|| ModelError::MissingObjective {
        model: model.name.clone(),
    })?;

    let n = model.variables().len();
    let mut lp = LpProblem::new(n);
    let mut integer_vars = Vec::new();

    for (i, var) in model.variables().iter().enumerate() {
        lp.bounds[i] = VariableBounds {
            lower: var.lower,
            upper: var.upper,
        };
        if var.kind == VariableKind::Binary {
            integer_vars.push(i);
        }
    }

    let cost = linearize(&objective.expr, model, &objective.name)?;
    lp.objective = cost.dense(n);
    lp.objective_offset = cost.constant;

    for constraint in model.constraints() {
        let lhs = linearize(&constraint.lhs, model, &constraint.name)?;
        let rhs = linearize(&constraint.rhs, model, &constraint.name)?;
        let form = lhs.minus(&rhs);
        lp.constraints.push(LinearConstraint {
            name: constraint.name.clone(),
            coefficients: form.dense(n),
            sense: match constraint.sense {
                ConstraintSense::GreaterEqual => RowSense::GreaterEqual,
                ConstraintSense::LessEqual => RowSense::LessEqual,
                ConstraintSense::Equal => RowSense::Equal,
            },
            rhs: -form.constant,
        });
    }

    debug!(
        model = %model.name,
        columns = n,
        rows = lp.constraints.len(),
        integers = integer_vars.len(),
        "Lowered model to linear program"
    );

    Ok(IlpProblem::new(lp, integer_vars))
}
