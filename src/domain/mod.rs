//! Solver-agnostic model vocabulary.

mod constraint;
mod dimension;
mod expression;
mod model;
mod params;
mod summary;

pub use constraint::{Constraint, ConstraintSense, Disjunct, Disjunction, TransformedDisjunction};
pub use dimension::{Dimension, Quantity};
pub use expression::{Expr, ExprDisplay, ParamId, VarId};
pub use model::{
    Choice, ChoiceLink, Model, ModelSolution, Objective, Parameter, SolveStatus, Variable,
    VariableKind,
};
pub use params::{
    ParameterOverrides, ParameterSet, SolarSizeTable, DEFAULT_SOLAR_INSTALLATION_SIZES,
};
pub use summary::Summary;
