//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic Rust usage.

use crate::error::Result;
use crate::port::solver::{IlpProblem, LpSolution, Solver};

/// HiGHS-based MILP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver;

impl HiGHSSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "highs")
    }

    #[cfg(feature = "highs")]
    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution> {
        use good_lp::solvers::highs::highs;
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

        let mut model = limited(vars.minimise(objective).using(highs), problem);
        for row in rows {
            model = model.with(row);
        }

        finish(self.name(), problem, &columns, model.solve())
    }

    #[cfg(not(feature = "highs"))]
    fn solve_ilp(&self, _problem: &IlpProblem) -> Result<LpSolution> {
        Err(crate::error::SolverError::SolveFailure {
            solver: self.name(),
            reason: "built without the `highs` feature".into(),
        }
        .into())
    }
}
