//! Solver port for linear and mixed-integer programming.
//!
//! Defines the trait every solver backend implements and the solver-neutral
//! problem and solution types the application lowers models into.
//!
//! # Overview
//!
//! - [`Solver`]: backend interface with an availability probe
//! - [`LpProblem`] / [`IlpProblem`]: problem definitions
//! - [`LpSolution`]: solution representation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Linear and mixed-integer programming solver.
///
/// Implementations wrap specific solver backends (HiGHS, microlp, ...) and
/// provide a unified interface for optimization problems.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so that independent
/// optimization runs can solve in parallel.
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Whether the backend can be invoked in this build.
    fn is_available(&self) -> bool;

    /// Solve a mixed-integer linear program.
    ///
    /// Infeasible and unbounded problems are reported through
    /// [`LpSolution::status`], not as errors. Backends that support it stop
    /// at [`IlpProblem::time_limit`] and report [`SolutionStatus::TimeLimit`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SolverError::SolveFailure`] when the backend
    /// crashes or reports a numerical failure.
    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution>;
}

/// Linear programming problem definition.
///
/// Represents a minimization problem of the form:
///
/// ```text
/// minimize    c^T * x + offset
/// subject to  constraints
///             bounds on x
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Objective function coefficients.
    pub objective: Vec<f64>,

    /// Constant term added to the objective value.
    pub objective_offset: f64,

    /// Linear constraints on the variables.
    pub constraints: Vec<LinearConstraint>,

    /// Lower and upper bounds for each variable.
    pub bounds: Vec<VariableBounds>,
}

impl LpProblem {
    /// Create a new LP problem with the specified number of variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            objective: vec![0.0; num_vars],
            objective_offset: 0.0,
            constraints: Vec::new(),
            bounds: vec![VariableBounds::default(); num_vars],
        }
    }

    /// Return the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }
}

/// Integer linear programming problem definition.
#[derive(Debug, Clone, PartialEq)]
pub struct IlpProblem {
    /// Underlying linear programming problem.
    pub lp: LpProblem,

    /// Indices of variables constrained to integer values.
    pub integer_vars: Vec<usize>,

    /// Wall-clock budget handed to the backend. `None` runs to completion.
    pub time_limit: Option<Duration>,
}

impl IlpProblem {
    #[must_use]
    pub const fn new(lp: LpProblem, integer_vars: Vec<usize>) -> Self {
        Self {
            lp,
            integer_vars,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// A single row: `sum(coefficients[i] * x[i]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Name of the model constraint this row came from.
    pub name: String,
    /// Coefficients for each variable.
    pub coefficients: Vec<f64>,
    pub sense: RowSense,
    pub rhs: f64,
}

/// Row sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSense {
    GreaterEqual,
    LessEqual,
    Equal,
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<f64>,
    /// Upper bound (None = +infinity).
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(1.0),
        }
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// Solution to a linear or integer programming problem.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Optimal values for each decision variable. Empty unless optimal.
    pub values: Vec<f64>,

    /// Optimal objective function value, including the offset.
    pub objective: f64,

    /// Termination status of the solver.
    pub status: SolutionStatus,
}

impl LpSolution {
    /// Return `true` if the solver found an optimal solution.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Solution carrying no values for a non-optimal outcome.
    #[must_use]
    pub const fn without_values(status: SolutionStatus) -> Self {
        Self {
            values: Vec::new(),
            objective: f64::NAN,
            status,
        }
    }
}

/// Termination status of an optimization solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Solver found an optimal solution.
    Optimal,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Backend stopped at its time limit before proving optimality.
    TimeLimit,
}
