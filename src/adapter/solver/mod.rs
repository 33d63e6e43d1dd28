//! Solver backends for mixed-integer linear programming.
//!
//! Implements the `port::solver::Solver` trait with good_lp backends. Each
//! backend is compiled in through its cargo feature; a backend whose feature
//! is off still registers under its name but probes as unavailable.

mod highs;
mod microlp;
#[cfg(any(feature = "highs", feature = "microlp"))]
mod translate;

pub use highs::HiGHSSolver;
pub use microlp::MicroLpSolver;
