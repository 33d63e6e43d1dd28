//! Symbolic constraints and the disjunctions built from them.

use serde::{Deserialize, Serialize};

use super::expression::{Expr, VarId};

/// A named relation `lhs {>=, <=, =} rhs` between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub lhs: Expr,
    pub sense: ConstraintSense,
    pub rhs: Expr,
}

impl Constraint {
    /// Create a >= constraint.
    pub fn geq(name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(name, lhs, ConstraintSense::GreaterEqual, rhs)
    }

    /// Create a <= constraint.
    pub fn leq(name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(name, lhs, ConstraintSense::LessEqual, rhs)
    }

    /// Create an = constraint.
    pub fn eq(name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(name, lhs, ConstraintSense::Equal, rhs)
    }

    fn new(
        name: impl Into<String>,
        lhs: impl Into<Expr>,
        sense: ConstraintSense,
        rhs: impl Into<Expr>,
    ) -> Self {
        Self {
            name: name.into(),
            lhs: lhs.into(),
            sense,
            rhs: rhs.into(),
        }
    }
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

impl ConstraintSense {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
        }
    }
}

/// One branch of a [`Disjunction`]: a conjunction of constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunct {
    pub name: String,
    pub constraints: Vec<Constraint>,
}

impl Disjunct {
    pub fn new(name: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            name: name.into(),
            constraints,
        }
    }
}

/// Logical rule requiring exactly one of its disjuncts to hold.
///
/// Disjunctions are not linear. They must be compiled away by the
/// disjunction transformer before the model can be solved.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunction {
    pub name: String,
    pub disjuncts: Vec<Disjunct>,
}

impl Disjunction {
    pub fn new(name: impl Into<String>, disjuncts: Vec<Disjunct>) -> Self {
        Self {
            name: name.into(),
            disjuncts,
        }
    }
}

/// Record of a disjunction after its big-M reformulation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedDisjunction {
    pub name: String,
    /// Indicator variable per disjunct, in declaration order.
    pub indicators: Vec<(String, VarId)>,
    /// Big-M value chosen for every relaxed constraint.
    pub big_m: Vec<(String, f64)>,
}
