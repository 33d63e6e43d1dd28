//! Application services.
//!
//! These turn a [`crate::domain::ParameterSet`] into a solved sizing decision
//! and coordinate the solver backends behind [`crate::port::solver::Solver`].

pub mod builder;
pub mod disjunction;
pub mod extract;
pub mod linear;
pub mod optimizer;
pub mod runner;
pub mod units;

pub use builder::ModelBuilder;
pub use disjunction::DisjunctionTransformer;
pub use extract::ResultExtractor;
pub use optimizer::{Optimization, Optimizer};
pub use runner::{RunnerSettings, SolverPhase, SolverRegistry, SolverRunner};
pub use units::UnitChecker;
