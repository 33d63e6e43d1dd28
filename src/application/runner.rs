//! Solver selection and invocation.
//!
//! A run moves through the phases
//!
//! ```text
//! requested -> probing_primary -> { solving | probing_fallback }
//!           -> { solved | infeasible | unbounded | no_solver | timeout }
//! ```
//!
//! The model must be dimensionally consistent and free of untransformed
//! disjunctions before any backend is invoked.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::adapter::solver::{HiGHSSolver, MicroLpSolver};
use crate::application::linear::compile;
use crate::application::units::UnitChecker;
use crate::domain::{Model, ModelSolution, SolveStatus};
use crate::error::{Error, Result, SolverError};
use crate::port::solver::{IlpProblem, LpSolution, SolutionStatus, Solver};

/// Ordered set of named solver backends.
#[derive(Default)]
pub struct SolverRegistry {
    solvers: Vec<Arc<dyn Solver>>,
}

impl SolverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every backend this crate ships, HiGHS first.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HiGHSSolver::new()));
        registry.register(Arc::new(MicroLpSolver::new()));
        registry
    }

    /// Register a backend, replacing any previous one with the same name.
    pub fn register(&mut self, solver: Arc<dyn Solver>) {
        match self.solvers.iter_mut().find(|s| s.name() == solver.name()) {
            Some(slot) => *slot = solver,
            None => self.solvers.push(solver),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Solver>> {
        self.solvers.iter().find(|s| s.name() == name).cloned()
    }

    /// Name and availability of every registered backend.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.solvers.iter().map(|s| (s.name(), s.is_available()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    fn available(&self, name: &str) -> Option<Arc<dyn Solver>> {
        self.get(name).filter(|s| s.is_available())
    }
}

/// Phase of a single solver run, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverPhase {
    Requested,
    ProbingPrimary,
    ProbingFallback,
    Solving,
    Solved,
    Infeasible,
    Unbounded,
    NoSolver,
    Timeout,
}

impl fmt::Display for SolverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requested => "requested",
            Self::ProbingPrimary => "probing_primary",
            Self::ProbingFallback => "probing_fallback",
            Self::Solving => "solving",
            Self::Solved => "solved",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::NoSolver => "no_solver",
            Self::Timeout => "timeout",
        })
    }
}

impl From<SolutionStatus> for SolverPhase {
    fn from(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal => Self::Solved,
            SolutionStatus::Infeasible => Self::Infeasible,
            SolutionStatus::Unbounded => Self::Unbounded,
            SolutionStatus::TimeLimit => Self::Timeout,
        }
    }
}

/// Limits applied around each solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Wall-clock limit for the async path. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum number of solver invocations in flight at once.
    pub max_concurrent: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            max_concurrent: num_cpus::get(),
        }
    }
}

pub struct SolverRunner {
    registry: Arc<SolverRegistry>,
    settings: RunnerSettings,
    permits: Arc<Semaphore>,
}

impl SolverRunner {
    #[must_use]
    pub fn new(registry: Arc<SolverRegistry>, settings: RunnerSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        Self {
            registry,
            settings,
            permits,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SolverRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Probe `requested`, then `fallback`, and return the first available
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::NoSolverAvailable`] when neither is available.
    pub fn select(&self, requested: &str, fallback: &str) -> std::result::Result<Arc<dyn Solver>, SolverError> {
        self.candidates(requested, fallback)
            .map(|mut chain| chain.remove(0))
    }

    /// Solve `model` on the calling thread.
    ///
    /// The timeout and concurrency cap only apply to [`Self::solve`].
    ///
    /// # Errors
    ///
    /// Fails on unit mismatches, untransformed disjunctions, when no solver is
    /// available, or when every candidate backend crashed.
    pub fn solve_blocking(&self, mut model: Model, requested: &str, fallback: &str) -> Result<(SolveStatus, Model)> {
        let problem = prepare(&model)?;
        let chain = self.candidates(requested, fallback)?;
        let (solver, solution) = run_chain(&chain, &problem, &AtomicUsize::new(0))?;
        let status = apply(&mut model, solver, &solution);
        Ok((status, model))
    }

    /// Solve `model` on the blocking pool, bounded by the configured timeout
    /// and concurrency cap.
    ///
    /// One deadline covers both the wait for a concurrency permit and the
    /// solve itself. The time left after acquiring a permit is handed to the
    /// backend as its own time limit, so backends that honour it stop and
    /// release the permit. When the deadline passes first the run is
    /// abandoned and the model comes back with [`SolveStatus::Timeout`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::solve_blocking`].
    pub async fn solve(&self, mut model: Model, requested: &str, fallback: &str) -> Result<(SolveStatus, Model)> {
        let mut problem = prepare(&model)?;
        let chain = self.candidates(requested, fallback)?;
        let names: Vec<&'static str> = chain.iter().map(|s| s.name()).collect();
        let deadline = self.settings.timeout.map(|limit| Instant::now() + limit);

        let acquire = Arc::clone(&self.permits).acquire_owned();
        let acquired = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, acquire).await {
                Ok(acquired) => acquired,
                Err(_) => {
                    warn!(
                        solver = names[0],
                        phase = %SolverPhase::Timeout,
                        "Timed out waiting for a solver slot"
                    );
                    model.record_status(SolveStatus::Timeout, None);
                    return Ok((SolveStatus::Timeout, model));
                }
            },
            None => acquire.await,
        };
        let permit = acquired.map_err(|e| SolverError::SolveFailure {
            solver: names[0],
            reason: e.to_string(),
        })?;

        if let Some(deadline) = deadline {
            problem = problem.with_time_limit(deadline.saturating_duration_since(Instant::now()));
        }

        let active = Arc::new(AtomicUsize::new(0));
        let task = {
            let active = Arc::clone(&active);
            tokio::task::spawn_blocking(move || {
                let outcome = run_chain(&chain, &problem, &active);
                drop(permit);
                outcome
            })
        };

        let joined = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let solver = names[active.load(Ordering::SeqCst).min(names.len() - 1)];
                    warn!(
                        solver,
                        phase = %SolverPhase::Timeout,
                        "Solver exceeded timeout, abandoning run"
                    );
                    model.record_status(SolveStatus::Timeout, Some(solver));
                    return Ok((SolveStatus::Timeout, model));
                }
            },
            None => task.await,
        };

        let (solver, solution) = joined.map_err(|e| SolverError::SolveFailure {
            solver: names[active.load(Ordering::SeqCst).min(names.len() - 1)],
            reason: format!("solver task aborted: {e}"),
        })??;
        let status = apply(&mut model, solver, &solution);
        Ok((status, model))
    }

    /// Available backends in the order they should be tried.
    fn candidates(&self, requested: &str, fallback: &str) -> std::result::Result<Vec<Arc<dyn Solver>>, SolverError> {
        debug!(requested, fallback, phase = %SolverPhase::Requested, "Selecting solver");

        let mut chain = Vec::with_capacity(2);
        debug!(solver = requested, phase = %SolverPhase::ProbingPrimary, "Probing solver");
        if let Some(primary) = self.registry.available(requested) {
            chain.push(primary);
        } else {
            warn!(requested, fallback, "Solver not available, trying fallback");
        }

        if fallback != requested {
            debug!(solver = fallback, phase = %SolverPhase::ProbingFallback, "Probing solver");
            if let Some(secondary) = self.registry.available(fallback) {
                chain.push(secondary);
            }
        }

        if chain.is_empty() {
            error!(requested, fallback, phase = %SolverPhase::NoSolver, "No solver available");
            return Err(SolverError::NoSolverAvailable {
                requested: requested.to_string(),
                fallback: fallback.to_string(),
            });
        }
        Ok(chain)
    }
}

/// Gate the model and lower it to a linear program.
fn prepare(model: &Model) -> Result<IlpProblem> {
    UnitChecker::check(model)?;
    compile(model)
}

/// Try each backend in turn. A backend that crashes hands over to the next;
/// infeasible and unbounded outcomes are final. `active` holds the index of
/// the backend currently running.
fn run_chain(
    chain: &[Arc<dyn Solver>],
    problem: &IlpProblem,
    active: &AtomicUsize,
) -> Result<(&'static str, LpSolution)> {
    let mut last_failure = None;
    for (index, solver) in chain.iter().enumerate() {
        active.store(index, Ordering::SeqCst);
        info!(solver = solver.name(), phase = %SolverPhase::Solving, "Invoking solver");
        match solver.solve_ilp(problem) {
            Ok(solution) => {
                info!(
                    solver = solver.name(),
                    phase = %SolverPhase::from(solution.status),
                    objective = solution.objective,
                    "Solver finished"
                );
                return Ok((solver.name(), solution));
            }
            Err(Error::Solver(failure @ SolverError::SolveFailure { .. })) => {
                warn!(solver = solver.name(), error = %failure, "Solver failed");
                last_failure = Some(failure);
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_failure
        .unwrap_or_else(|| SolverError::SolveFailure {
            solver: "none",
            reason: "no solver was invoked".to_string(),
        })
        .into())
}

fn apply(model: &mut Model, solver: &'static str, solution: &LpSolution) -> SolveStatus {
    match solution.status {
        SolutionStatus::Optimal => {
            model.record_solution(ModelSolution {
                solver,
                objective: solution.objective,
                values: solution.values.clone(),
            });
            SolveStatus::Solved
        }
        SolutionStatus::Infeasible => {
            model.record_status(SolveStatus::Infeasible, Some(solver));
            SolveStatus::Infeasible
        }
        SolutionStatus::Unbounded => {
            model.record_status(SolveStatus::Unbounded, Some(solver));
            SolveStatus::Unbounded
        }
        SolutionStatus::TimeLimit => {
            model.record_status(SolveStatus::Timeout, Some(solver));
            SolveStatus::Timeout
        }
    }
}
