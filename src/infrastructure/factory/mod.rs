//! Factory functions that build configured components.
//!
//! - [`solver`] - Solver registry, runner and optimizer construction

pub mod solver;

pub use solver::{build_optimizer, build_registry, build_runner};
