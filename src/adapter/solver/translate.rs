//! Translation of solver-neutral problems into good_lp models and back.

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus as LpStatus, Variable,
    WithTimeLimit,
};

use crate::error::{Result, SolverError};
use crate::port::solver::{IlpProblem, LpSolution, RowSense, SolutionStatus};

/// good_lp view of an [`IlpProblem`], one column per problem variable.
pub(super) struct Translated {
    pub vars: ProblemVariables,
    pub columns: Vec<Variable>,
    pub objective: Expression,
    pub rows: Vec<good_lp::Constraint>,
}

pub(super) fn translate(problem: &IlpProblem) -> Translated {
    let lp = &problem.lp;
    let mut vars = ProblemVariables::new();

    let columns: Vec<Variable> = lp
        .bounds
        .iter()
        .enumerate()
        .map(|(i, bounds)| {
            let mut v = variable();
            if let Some(lb) = bounds.lower {
                v = v.min(lb);
            }
            if let Some(ub) = bounds.upper {
                v = v.max(ub);
            }
            if problem.integer_vars.contains(&i) {
                v = v.integer();
            }
            vars.add(v)
        })
        .collect();

    let objective: Expression = columns
        .iter()
        .zip(lp.objective.iter())
        .map(|(v, c)| *c * *v)
        .sum();

    let rows = lp
        .constraints
        .iter()
        .map(|row| {
            let lhs: Expression = columns
                .iter()
                .zip(row.coefficients.iter())
                .filter(|(_, c)| **c != 0.0)
                .map(|(v, c)| *c * *v)
                .sum();
            let rhs = row.rhs;
            match row.sense {
                RowSense::GreaterEqual => constraint!(lhs >= rhs),
                RowSense::LessEqual => constraint!(lhs <= rhs),
                RowSense::Equal => constraint!(lhs == rhs),
            }
        })
        .collect();

    Translated {
        vars,
        columns,
        objective,
        rows,
    }
}

/// Apply the problem's time limit to a backend model, if it has one.
pub(super) fn limited<M: WithTimeLimit>(model: M, problem: &IlpProblem) -> M {
    match problem.time_limit {
        Some(limit) => model.with_time_limit(limit.as_secs_f64()),
        None => model,
    }
}

/// Map a good_lp outcome onto the port's solution type.
///
/// Infeasible and unbounded outcomes become statuses, as does a run cut
/// short by the time limit; any other resolution error is a solve failure
/// of `solver`.
pub(super) fn finish<S: Solution>(
    solver: &'static str,
    problem: &IlpProblem,
    columns: &[Variable],
    outcome: std::result::Result<S, ResolutionError>,
) -> Result<LpSolution> {
    match outcome {
        Ok(solution) if matches!(solution.status(), LpStatus::TimeLimit) => {
            Ok(LpSolution::without_values(SolutionStatus::TimeLimit))
        }
        Ok(solution) => {
            let values: Vec<f64> = columns.iter().map(|v| solution.value(*v)).collect();

            // Re-evaluate objective with the solved values
            let objective = values
                .iter()
                .zip(problem.lp.objective.iter())
                .map(|(x, c)| x * c)
                .sum::<f64>()
                + problem.lp.objective_offset;

            Ok(LpSolution {
                values,
                objective,
                status: SolutionStatus::Optimal,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(LpSolution::without_values(SolutionStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(LpSolution::without_values(SolutionStatus::Unbounded)),
        // microlp gives up without an incumbent
        Err(ResolutionError::Other(reason)) if problem.time_limit.is_some() && reason.starts_with("Time limit") => {
            Ok(LpSolution::without_values(SolutionStatus::TimeLimit))
        }
        Err(other) => Err(SolverError::SolveFailure {
            solver,
            reason: other.to_string(),
        }
        .into()),
    }
}

/// Solution of a problem without variables.
pub(super) fn empty(problem: &IlpProblem) -> LpSolution {
    LpSolution {
        values: Vec::new(),
        objective: problem.lp.objective_offset,
        status: SolutionStatus::Optimal,
    }
}
