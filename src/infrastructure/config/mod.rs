//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;
pub mod solver;

pub use logging::LoggingConfig;
pub use settings::Config;
pub use solver::SolverConfig;
