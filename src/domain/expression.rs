//! Symbolic algebraic expressions over model parameters and variables.
//!
//! Expressions are kept symbolic until the model is lowered to a linear
//! program so that the unit checker can walk the same tree the author wrote.
//! Arithmetic operators build the tree:
//!
//! ```
//! use solarsizer::domain::{Dimension, Expr, Model, Quantity, VariableKind};
//!
//! let mut model = Model::new("example");
//! let price = model.add_parameter("price", 0.5, Dimension::CURRENCY_PER_ENERGY);
//! let draw = model.add_variable("draw", VariableKind::Continuous, Some(0.0), None, Dimension::ENERGY);
//! let cost: Expr = price * draw + Quantity::currency(1.0);
//! assert_eq!(cost.display(&model).to_string(), "price·draw + 1");
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::dimension::Quantity;
use super::model::Model;

/// Index of a decision variable inside its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Column index of this variable in the lowered problem.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a parameter inside its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub(crate) usize);

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Quantity),
    Parameter(ParamId),
    Variable(VarId),
    Sum(Vec<Expr>),
    Negate(Box<Expr>),
    Product(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Sum of an arbitrary number of terms.
    ///
    /// An empty iterator yields an empty sum, which the unit checker treats as
    /// having no dimension of its own.
    pub fn sum<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        let mut flat = Vec::new();
        for term in terms {
            match term.into() {
                Expr::Sum(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Expr::Sum(flat)
    }

    /// Render the expression with the names declared in `model`.
    #[must_use]
    pub fn display<'a>(&'a self, model: &'a Model) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, model }
    }

    /// Variables referenced anywhere in the tree, in order of appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<VarId> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<VarId>) {
        match self {
            Expr::Constant(_) | Expr::Parameter(_) => {}
            Expr::Variable(id) => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            Expr::Sum(terms) => terms.iter().for_each(|t| t.collect_variables(out)),
            Expr::Negate(inner) => inner.collect_variables(out),
            Expr::Product(lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }
}

impl From<VarId> for Expr {
    fn from(id: VarId) -> Self {
        Expr::Variable(id)
    }
}

impl From<ParamId> for Expr {
    fn from(id: ParamId) -> Self {
        Expr::Parameter(id)
    }
}

impl From<Quantity> for Expr {
    fn from(quantity: Quantity) -> Self {
        Expr::Constant(quantity)
    }
}

macro_rules! impl_expr_ops {
    ($($ty:ty),*) => {$(
        impl<T: Into<Expr>> Add<T> for $ty {
            type Output = Expr;

            fn add(self, rhs: T) -> Expr {
                Expr::sum([Expr::from(self), rhs.into()])
            }
        }

        impl<T: Into<Expr>> Sub<T> for $ty {
            type Output = Expr;

            fn sub(self, rhs: T) -> Expr {
                Expr::sum([Expr::from(self), Expr::Negate(Box::new(rhs.into()))])
            }
        }

        impl<T: Into<Expr>> Mul<T> for $ty {
            type Output = Expr;

            fn mul(self, rhs: T) -> Expr {
                Expr::Product(Box::new(Expr::from(self)), Box::new(rhs.into()))
            }
        }

        impl Neg for $ty {
            type Output = Expr;

            fn neg(self) -> Expr {
                Expr::Negate(Box::new(Expr::from(self)))
            }
        }
    )*};
}

impl_expr_ops!(Expr, VarId, ParamId, Quantity);

/// [`Expr`] paired with the model that names its leaves.
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    model: &'a Model,
}

impl ExprDisplay<'_> {
    fn write(&self, f: &mut fmt::Formatter<'_>, expr: &Expr, nested: bool) -> fmt::Result {
        match expr {
            Expr::Constant(q) => write!(f, "{}", q.value),
            Expr::Parameter(id) => f.write_str(self.model.parameter(*id).name.as_str()),
            Expr::Variable(id) => f.write_str(self.model.variable(*id).name.as_str()),
            Expr::Sum(terms) => {
                if nested {
                    f.write_str("(")?;
                }
                for (i, term) in terms.iter().enumerate() {
                    match term {
                        Expr::Negate(inner) if i > 0 => {
                            f.write_str(" - ")?;
                            self.write(f, inner, true)?;
                        }
                        _ => {
                            if i > 0 {
                                f.write_str(" + ")?;
                            }
                            self.write(f, term, false)?;
                        }
                    }
                }
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Expr::Negate(inner) => {
                f.write_str("-")?;
                self.write(f, inner, true)
            }
            Expr::Product(lhs, rhs) => {
                self.write(f, lhs, true)?;
                f.write_str("·")?;
                self.write(f, rhs, true)
            }
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, self.expr, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimension, VariableKind};

    fn sample() -> (Model, VarId, VarId, ParamId) {
        let mut model = Model::new("test");
        let x = model.add_variable("x", VariableKind::Continuous, Some(0.0), None, Dimension::ENERGY);
        let y = model.add_variable("y", VariableKind::Continuous, Some(0.0), None, Dimension::ENERGY);
        let p = model.add_parameter("p", 2.0, Dimension::CURRENCY_PER_ENERGY);
        (model, x, y, p)
    }

    #[test]
    fn sums_are_flattened() {
        let (_, x, y, _) = sample();
        let expr = x + y + x;
        match expr {
            Expr::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected flat sum, got {other:?}"),
        }
    }

    #[test]
    fn subtraction_renders_with_minus() {
        let (model, x, y, p) = sample();
        let expr = p * (x - y);
        assert_eq!(expr.display(&model).to_string(), "p·(x - y)");
    }

    #[test]
    fn variables_are_deduplicated() {
        let (_, x, y, p) = sample();
        let expr = p * x + y - x;
        assert_eq!(expr.variables(), vec![x, y]);
    }
}
