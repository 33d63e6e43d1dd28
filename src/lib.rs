//! Solarsizer - cost-optimal sizing of a residential solar installation and
//! battery.
//!
//! Given grid tariffs, per-period demand and a catalogue of installation sizes,
//! the crate builds a mixed-integer model, reformulates its battery-sizing
//! disjunction with big-M constraints, verifies physical dimensions and hands
//! the result to a linear programming backend.
//!
//! # Architecture
//!
//! - **`domain`** - Model vocabulary: dimensions, expressions, constraints,
//!   parameters and the solve summary
//! - **`port`** - The `Solver` trait and solver-neutral problem types
//! - **`adapter`** - good_lp backends (HiGHS, microlp)
//! - **`application`** - Model building, disjunction transformation, unit
//!   checking, solving and result extraction
//! - **`infrastructure`** - Configuration, logging and component wiring
//! - **`cli`** - Command-line interface
//!
//! # Features
//!
//! - `highs` - HiGHS backend (default)
//! - `microlp` - Pure Rust microlp backend (default)
//!
//! # Example
//!
//! ```no_run
//! use solarsizer::domain::ParameterSet;
//! use solarsizer::infrastructure::config::SolverConfig;
//! use solarsizer::infrastructure::factory::build_optimizer;
//!
//! # async fn run() -> solarsizer::error::Result<()> {
//! let optimizer = build_optimizer(&SolverConfig::default());
//! let outcome = optimizer.optimize(&ParameterSet::default()).await?;
//! println!("{:?}", outcome.summary);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
