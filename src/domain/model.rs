//! The optimization model: variables, parameters, constraints, choice sets,
//! disjunctions and the objective, plus the values written back by a solve.
//!
//! A [`Model`] is built fresh for each optimization run and owns all of its
//! state. Nothing is shared between runs.

use std::fmt;

use serde::Serialize;

use super::constraint::{Constraint, Disjunction, TransformedDisjunction};
use super::dimension::{Dimension, Quantity};
use super::expression::{Expr, ParamId, VarId};

/// Integrality of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Continuous,
    /// Integer variable restricted to {0, 1}.
    Binary,
}

/// A decision variable with optional bounds (None = unbounded on that side).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub dimension: Dimension,
}

/// A named constant of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    pub dimension: Dimension,
}

/// Cost expression to minimise together with the dimension it must have.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub name: String,
    pub expr: Expr,
    pub dimension: Dimension,
}

/// A variable whose value is fixed by the active option of a [`Choice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceLink {
    pub var: VarId,
    /// Value taken by `var` for each option, aligned with `Choice::flags`.
    pub values: Vec<Quantity>,
}

/// A set of mutually exclusive options selected through binary flags.
///
/// Exactly one flag is active in any feasible solution. Linked variables
/// equal the flag-weighted sum of their per-option values.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub name: String,
    /// Label of each option (e.g. the installation size).
    pub options: Vec<i64>,
    pub flags: Vec<VarId>,
    pub links: Vec<ChoiceLink>,
}

impl Choice {
    /// Coefficient vector expressing `var` over this choice's flags, if `var`
    /// is one of the flags or a linked variable.
    #[must_use]
    pub fn representation(&self, var: VarId) -> Option<Vec<f64>> {
        if let Some(pos) = self.flags.iter().position(|f| *f == var) {
            let mut unit = vec![0.0; self.flags.len()];
            unit[pos] = 1.0;
            return Some(unit);
        }
        self.links
            .iter()
            .find(|link| link.var == var)
            .map(|link| link.values.iter().map(|q| q.value).collect())
    }
}

/// Outcome of a solve as recorded on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// No solve has been attempted yet.
    NotSolved,
    Solved,
    Infeasible,
    Unbounded,
    /// The solve was abandoned after the configured timeout.
    Timeout,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSolved => "not solved",
            Self::Solved => "solved",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Timeout => "timeout",
        })
    }
}

/// Values written back after a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSolution {
    pub solver: &'static str,
    pub objective: f64,
    /// Value of every variable, indexed by [`VarId::index`].
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    variables: Vec<Variable>,
    parameters: Vec<Parameter>,
    constraints: Vec<Constraint>,
    choices: Vec<Choice>,
    disjunctions: Vec<Disjunction>,
    transformed: Vec<TransformedDisjunction>,
    objective: Option<Objective>,
    status: SolveStatus,
    solver_used: Option<&'static str>,
    solution: Option<ModelSolution>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            parameters: Vec::new(),
            constraints: Vec::new(),
            choices: Vec::new(),
            disjunctions: Vec::new(),
            transformed: Vec::new(),
            objective: None,
            status: SolveStatus::NotSolved,
            solver_used: None,
            solution: None,
        }
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        kind: VariableKind,
        lower: Option<f64>,
        upper: Option<f64>,
        dimension: Dimension,
    ) -> VarId {
        let (lower, upper) = match kind {
            VariableKind::Binary => (Some(0.0), Some(1.0)),
            VariableKind::Continuous => (lower, upper),
        };
        self.variables.push(Variable {
            name: name.into(),
            kind,
            lower,
            upper,
            dimension,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(name, VariableKind::Binary, None, None, Dimension::DIMENSIONLESS)
    }

    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: f64,
        dimension: Dimension,
    ) -> ParamId {
        self.parameters.push(Parameter {
            name: name.into(),
            value,
            dimension,
        });
        ParamId(self.parameters.len() - 1)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Declare an enumerated choice over `options`.
    ///
    /// Adds one binary flag per option, a cardinality constraint forcing
    /// exactly one flag on, and for each `(var, values)` link a constraint
    /// `var == Σ values[i] · flag[i]`.
    pub fn add_choice(
        &mut self,
        name: impl Into<String>,
        options: Vec<i64>,
        links: Vec<(VarId, Vec<Quantity>)>,
    ) -> usize {
        let name = name.into();
        let flags: Vec<VarId> = options
            .iter()
            .map(|option| self.add_binary(format!("{name}_flag[{option}]")))
            .collect();

        self.add_constraint(Constraint::eq(
            format!("{name}_cardinality"),
            Expr::sum(flags.iter().copied()),
            Quantity::dimensionless(1.0),
        ));

        let mut choice_links = Vec::with_capacity(links.len());
        for (var, values) in links {
            let weighted = Expr::sum(
                values
                    .iter()
                    .zip(&flags)
                    .map(|(value, flag)| *value * *flag),
            );
            let link_name = format!("{name}_{}_link", self.variable(var).name);
            self.add_constraint(Constraint::eq(link_name, var, weighted));
            choice_links.push(ChoiceLink { var, values });
        }

        self.choices.push(Choice {
            name,
            options,
            flags,
            links: choice_links,
        });
        self.choices.len() - 1
    }

    pub fn add_disjunction(&mut self, disjunction: Disjunction) {
        self.disjunctions.push(disjunction);
    }

    pub fn set_objective(&mut self, name: impl Into<String>, expr: Expr, dimension: Dimension) {
        self.objective = Some(Objective {
            name: name.into(),
            expr,
            dimension,
        });
    }

    #[must_use]
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    #[must_use]
    pub fn parameter(&self, id: ParamId) -> &Parameter {
        &self.parameters[id.0]
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, name: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    #[must_use]
    pub fn transformed_disjunctions(&self) -> &[TransformedDisjunction] {
        &self.transformed
    }

    #[must_use]
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Look a variable up by its declared name.
    #[must_use]
    pub fn find_variable(&self, name: &str) -> Option<VarId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(VarId)
    }

    #[must_use]
    pub const fn status(&self) -> SolveStatus {
        self.status
    }

    /// Backend that produced the current status, if a solve ran.
    #[must_use]
    pub const fn solver_used(&self) -> Option<&'static str> {
        self.solver_used
    }

    #[must_use]
    pub fn solution(&self) -> Option<&ModelSolution> {
        self.solution.as_ref()
    }

    /// Solved value of `id`, if the model carries a solution.
    #[must_use]
    pub fn value(&self, id: VarId) -> Option<f64> {
        self.solution.as_ref().and_then(|s| s.values.get(id.0).copied())
    }

    pub(crate) fn take_disjunctions(&mut self) -> Vec<Disjunction> {
        std::mem::take(&mut self.disjunctions)
    }

    pub(crate) fn record_transformation(&mut self, record: TransformedDisjunction) {
        self.transformed.push(record);
    }

    pub(crate) fn record_solution(&mut self, solution: ModelSolution) {
        self.status = SolveStatus::Solved;
        self.solver_used = Some(solution.solver);
        self.solution = Some(solution);
    }

    pub(crate) fn record_status(&mut self, status: SolveStatus, solver: Option<&'static str>) {
        self.status = status;
        self.solver_used = solver;
        self.solution = None;
    }
}
