use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SolveStatus;

/// Malformed parameters or configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("solar_installation_sizes must contain at least one entry")]
    EmptySizeTable,

    #[error("invalid solar installation size {size}: {reason}")]
    InvalidSize { size: i64, reason: String },

    #[error("cannot derive big-M for constraint {constraint}: variable {variable} has no finite bound")]
    UnboundedDisjunct { constraint: String, variable: String },

    #[error("failed to read config file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Structural problems with a model that prevent lowering it to a linear program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{location}: product `{expression}` is not linear and cannot be expanded over a choice set")]
    Nonlinear { location: String, expression: String },

    #[error("disjunction {name} must be transformed before solving")]
    UntransformedDisjunction { name: String },

    #[error("disjunction {name} has no disjuncts")]
    EmptyDisjunction { name: String },

    #[error("model {model} has no objective")]
    MissingObjective { model: String },
}

/// One dimensionally inconsistent expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitMismatch {
    /// Constraint or objective the expression belongs to.
    pub location: String,
    pub expression: String,
    pub detail: String,
}

impl fmt::Display for UnitMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: `{}` ({})", self.location, self.expression, self.detail)
    }
}

/// Every dimensional inconsistency found by the unit checker.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} unit mismatch(es): {}", .mismatches.len(), join(.mismatches))]
pub struct UnitMismatchError {
    pub mismatches: Vec<UnitMismatch>,
}

fn join(mismatches: &[UnitMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Solver selection and invocation failures.
///
/// Infeasible and unbounded outcomes are not errors; they are reported as a
/// [`SolveStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("no solver available (tried requested '{requested}' and fallback '{fallback}')")]
    NoSolverAvailable { requested: String, fallback: String },

    #[error("solver '{solver}' failed: {reason}")]
    SolveFailure { solver: &'static str, reason: String },
}

/// Reading results out of a model that was not solved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("cannot extract results: model status is {status}")]
    NotSolved { status: SolveStatus },

    #[error("cannot extract results: model has no variable named {name}")]
    MissingVariable { name: &'static str },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    UnitMismatch(#[from] UnitMismatchError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
