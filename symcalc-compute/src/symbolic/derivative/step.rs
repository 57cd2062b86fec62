//! The derivation trace recorded by the [`Differentiator`](super::Differentiator).

use crate::symbolic::expr::{ExprArena, ExprId};
use std::{collections::HashMap, fmt::{self, Write}};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The address of a [`DerivationStep`] in a [`StepTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepId(usize);

impl StepId {
    /// Returns the position of the step in the tree.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The calculus rule used to differentiate an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rule {
    /// The expression does not depend on the variable.
    Constant,

    /// The expression is a variable.
    Variable,

    /// `(f + g)' = f' + g'`
    Sum,

    /// `(f - g)' = f' - g'`
    Difference,

    /// `(fg)' = f'g + fg'`
    Product,

    /// `(cf)' = cf'`
    Factor,

    /// `(f/g)' = (f'g - fg') / g^2`
    Quotient,

    /// `f(g(x))' = f'(g(x)) g'(x)`
    Chain,

    /// `(x^n)' = nx^(n-1)`
    Power,

    /// `(c/g)' = -cg' / g^2`
    Reciprocal,

    /// A function of the bare variable, or an expression that was rewritten before being
    /// differentiated.
    Other,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Constant => "constant",
            Rule::Variable => "variable",
            Rule::Sum => "sum rule",
            Rule::Difference => "difference rule",
            Rule::Product => "product rule",
            Rule::Factor => "constant factor rule",
            Rule::Quotient => "quotient rule",
            Rule::Chain => "chain rule",
            Rule::Power => "power rule",
            Rule::Reciprocal => "reciprocal rule",
            Rule::Other => "known derivative",
        };
        f.write_str(name)
    }
}

/// One expression visited while differentiating, with its derivative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivationStep {
    /// The expression that was differentiated.
    pub expr: ExprId,

    /// The derivative as built by the rule, before it was simplified. The derivatives of
    /// subexpressions appear as `nderiv(f, x, 1)`.
    pub intermediate: Option<ExprId>,

    /// The simplified derivative.
    pub derivative: Option<ExprId>,

    /// The rule that was applied.
    pub rule: Rule,

    /// The steps for the subexpressions that had to be differentiated, in the order they were
    /// visited.
    pub substeps: Vec<StepId>,

    /// The step that needed this one, or [`None`] for the root step.
    pub parent: Option<StepId>,
}

/// The steps taken to differentiate an expression, with one step per visited node.
///
/// Steps are keyed by [`ExprId`], so two structurally equal subexpressions stored at different
/// ids get separate steps, while a node visited twice has a single step.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepTree {
    steps: Vec<DerivationStep>,
    by_expr: HashMap<ExprId, StepId>,
}

impl StepTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Creates the step for an expression, attaching it to the parent step.
    ///
    /// # Panics
    ///
    /// Panics if the expression already has a step.
    pub(crate) fn insert(&mut self, expr: ExprId, parent: Option<StepId>) -> StepId {
        let id = StepId(self.steps.len());
        let previous = self.by_expr.insert(expr, id);
        assert!(previous.is_none(), "expression {:?} was registered twice", expr);

        self.steps.push(DerivationStep {
            expr,
            intermediate: None,
            derivative: None,
            rule: Rule::Other,
            substeps: Vec::new(),
            parent,
        });
        if let Some(parent) = parent {
            self.steps[parent.0].substeps.push(id);
        }
        id
    }

    /// Returns the step with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    pub fn get(&self, id: StepId) -> &DerivationStep {
        &self.steps[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: StepId) -> &mut DerivationStep {
        &mut self.steps[id.0]
    }

    /// Returns the step recorded for the given expression, if it was visited.
    pub fn step_for(&self, expr: ExprId) -> Option<StepId> {
        self.by_expr.get(&expr).copied()
    }

    /// Returns the root step, the first one created.
    pub fn root(&self) -> Option<StepId> {
        (!self.steps.is_empty()).then_some(StepId(0))
    }

    /// Iterates over the steps in the order they were created.
    pub fn iter(&self) -> impl Iterator<Item = (StepId, &DerivationStep)> {
        self.steps.iter().enumerate().map(|(i, step)| (StepId(i), step))
    }

    /// Renders the tree as an indented trace, one line per step:
    ///
    /// ```text
    /// d/dx x^2 = 2 * x  [power rule]
    ///   d/dx x = 1  [variable]
    /// ```
    pub fn display(&self, arena: &ExprArena, variable: &str) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            self.write_step(&mut out, arena, variable, root, 0);
        }
        out
    }

    fn write_step(&self, out: &mut String, arena: &ExprArena, variable: &str, id: StepId, indent: usize) {
        let step = self.get(id);
        let _ = write!(out, "{:indent$}d/d{} {} = ", "", variable, arena.node(step.expr), indent = indent * 2);
        match step.derivative {
            Some(derivative) => out.push_str(&arena.node(derivative).to_string()),
            None => out.push('?'),
        }
        let _ = writeln!(out, "  [{}]", step.rule);

        for &substep in &step.substeps {
            self.write_step(out, arena, variable, substep, indent + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn links_parents_and_children() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        let y = arena.var("y");
        let sum = arena.add(x, y);

        let mut tree = StepTree::new();
        let root = tree.insert(sum, None);
        let first = tree.insert(x, Some(root));
        let second = tree.insert(y, Some(root));

        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.get(root).substeps, vec![first, second]);
        assert_eq!(tree.get(second).parent, Some(root));
        assert_eq!(tree.step_for(y), Some(second));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_registration_fails() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        let mut tree = StepTree::new();
        tree.insert(x, None);
        tree.insert(x, None);
    }
}
