//! Pure-Rust microlp solver via good_lp.
//!
//! Slower than HiGHS on large instances but needs no native library, which
//! makes it the fallback backend.

use crate::error::Result;
use crate::port::solver::{IlpProblem, LpSolution, Solver};

/// microlp-based MILP solver (simplex with branch-and-bound).
#[derive(Debug, Default, Clone)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "microlp")
    }

    #[cfg(feature = "microlp")]
    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution> {
        use good_lp::solvers::microlp::microlp;
        use good_lp::SolverModel;

        use super::translate::{empty, finish, limited, translate, Translated};

        if problem.lp.num_vars() == 0 {
            return Ok(empty(problem));
        }

        let Translated {
            vars,
            columns,
            objective,
            rows,
        } = translate(problem);

        let mut model = limited(vars.minimise(objective).using(microlp), problem);
        for row in rows {
            model = model.with(row);
        }

        finish(self.name(), problem, &columns, model.solve())
    }

    #[cfg(not(feature = "microlp"))]
    fn solve_ilp(&self, _problem: &IlpProblem) -> Result<LpSolution> {
        Err(crate::error::SolverError::SolveFailure {
            solver: self.name(),
            reason: "built without the `microlp` feature".into(),
        }
        .into())
    }
}

#[cfg(all(test, feature = "microlp"))]
mod tests {
    use super::*;
    use crate::port::solver::{LinearConstraint, LpProblem, RowSense, SolutionStatus, VariableBounds};
    use std::time::Duration;

    #[test]
    fn picks_cheapest_exclusive_option() {
        // Minimize 3a + 2b + 4c with a + b + c = 1, all binary.
        let solver = MicroLpSolver::new();

        let mut lp = LpProblem::new(3);
        lp.objective = vec![3.0, 2.0, 4.0];
        lp.bounds = vec![VariableBounds::binary(); 3];
        lp.constraints.push(LinearConstraint {
            name: "exactly_one".into(),
            coefficients: vec![1.0, 1.0, 1.0],
            sense: RowSense::Equal,
            rhs: 1.0,
        });

        let solution = solver.solve_ilp(&IlpProblem::new(lp, vec![0, 1, 2])).unwrap();

        assert!(solution.is_optimal());
        assert!((solution.values[1] - 1.0).abs() < 1e-6);
        assert!((solution.objective - 2.0).abs() < 1e-6);
    }

    #[test]
    fn unbounded_is_a_status() {
        // Minimize -x subject to x >= 1, no upper bound.
        let solver = MicroLpSolver::new();

        let mut lp = LpProblem::new(1);
        lp.objective = vec![-1.0];
        lp.constraints.push(LinearConstraint {
            name: "floor".into(),
            coefficients: vec![1.0],
            sense: RowSense::GreaterEqual,
            rhs: 1.0,
        });

        let solution = solver.solve_ilp(&IlpProblem::new(lp, vec![])).unwrap();
        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn generous_time_limit_still_solves() {
        let solver = MicroLpSolver::new();

        let mut lp = LpProblem::new(1);
        lp.objective = vec![1.0];
        lp.bounds = vec![VariableBounds::bounded(0.0, 10.0)];
        lp.constraints.push(LinearConstraint {
            name: "floor".into(),
            coefficients: vec![1.0],
            sense: RowSense::GreaterEqual,
            rhs: 4.0,
        });

        let problem = IlpProblem::new(lp, vec![0]).with_time_limit(Duration::from_secs(10));
        let solution = solver.solve_ilp(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.values[0] - 4.0).abs() < 1e-6);
    }
}
