//! Symbolic differentiation.
//!
//! The [`Differentiator`] computes the derivative of an expression with respect to one variable.
//! Every node it visits goes through the same steps:
//!
//! 1. If the node does not contain the variable, its derivative is `0`.
//! 2. Otherwise, the calculus rule for the node's operator is applied, differentiating the
//!    children the rule needs.
//! 3. The resulting derivative is simplified with a [`Simplifier`].
//!
//! Unless disabled with [`Differentiator::with_trace`], each visited node also gets a
//! [`DerivationStep`] in a [`StepTree`], recording the rule applied, the derivative as the rule
//! wrote it, and the simplified derivative.
//!
//! ```
//! use symcalc_compute::symbolic::{derivative::Differentiator, expr::ExprArena};
//!
//! let mut arena = ExprArena::new();
//! let expr = arena.parse("sin(x)").unwrap();
//! let mut differentiator = Differentiator::new("x");
//! let derivative = differentiator.differentiate(&mut arena, expr).unwrap();
//! assert_eq!(arena.node(derivative).to_string(), "cos(x)");
//! ```

mod function;
pub mod step;

use crate::error::{
    ArityError,
    InvalidChild,
    InvalidConfiguration,
    RecursionLimitExceeded,
    UndefinedFunction,
    UnsupportedOperation,
};
use crate::numerical::ctxt::{Ctxt, MAX_RECURSION_DEPTH};
use crate::symbolic::{
    analyzer::Analyzer,
    expr::{op::{BinaryOp, NaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::Simplifier,
};
use function::outer_derivative;
use num_complex::Complex64;
use std::collections::HashMap;
use symcalc_error::Error;
use tracing::{debug, trace};

pub use step::{DerivationStep, Rule, StepId, StepTree};

/// The result of applying a rule to a node.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    /// The derivative with the derivatives of the children left as `nderiv(f, x, 1)`, if a
    /// trace is being recorded.
    intermediate: Option<ExprId>,

    /// The derivative, not yet simplified.
    derivative: ExprId,

    rule: Rule,
}

/// Builds a [`UnsupportedOperation`] error for the node.
fn unsupported(arena: &ExprArena, id: ExprId, what: &str) -> Error {
    arena.error_at(id, UnsupportedOperation { operation: format!("differentiate {}", what) })
}

/// Computes symbolic derivatives.
///
/// A differentiator holds the state of one differentiation at a time (the step tree and the
/// derivatives computed so far), so it must not be shared between concurrent requests.
#[derive(Debug, Clone)]
pub struct Differentiator<'c> {
    /// The variable to differentiate with respect to.
    variable: Option<String>,

    /// The context defining the user functions that may be called.
    params: Option<&'c Ctxt>,

    simplifier: Simplifier,

    /// Whether to record a [`StepTree`].
    trace: bool,
    steps: StepTree,

    /// The derivative of each node visited so far.
    memo: HashMap<ExprId, ExprId>,

    /// The steps of the nodes currently being differentiated, innermost last.
    stack: Vec<StepId>,

    /// The expression currently differentiated as a whole, with no enclosing expression. This is
    /// the expression given to [`Differentiator::differentiate`], or the expanded body of a
    /// user-defined function or nested derivative while it is being differentiated.
    root: Option<ExprId>,

    depth: usize,
    max_depth: usize,
}

impl Default for Differentiator<'_> {
    /// Creates a differentiator with no variable. It must be given one with
    /// [`Differentiator::with_variable`] before use.
    fn default() -> Self {
        Self {
            variable: None,
            params: None,
            simplifier: Simplifier::new(),
            trace: true,
            steps: StepTree::new(),
            memo: HashMap::new(),
            stack: Vec::new(),
            root: None,
            depth: 0,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }
}

impl<'c> Differentiator<'c> {
    /// Creates a differentiator with respect to the given variable.
    pub fn new(variable: impl Into<String>) -> Self {
        Self::default().with_variable(variable)
    }

    /// Sets the variable to differentiate with respect to.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Sets the context in which calls to user-defined functions are looked up.
    pub fn with_params(mut self, params: &'c Ctxt) -> Self {
        self.params = Some(params);
        self
    }

    /// Sets whether a [`StepTree`] is recorded. Defaults to `true`.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the maximum depth of the expressions the differentiator accepts. Deeper expressions
    /// fail with [`RecursionLimitExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.simplifier = self.simplifier.with_max_depth(max_depth);
        self
    }

    /// Returns the variable to differentiate with respect to.
    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    /// Returns the steps recorded by the last differentiation.
    pub fn steps(&self) -> &StepTree {
        &self.steps
    }

    /// Returns the root step of the last differentiation.
    pub fn root_step(&self) -> Option<&DerivationStep> {
        self.steps.root().map(|root| self.steps.get(root))
    }

    /// Differentiates the expression, returning the id of the simplified derivative.
    pub fn differentiate(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        if self.variable.is_none() {
            return Err(arena.error_at(id, InvalidConfiguration {
                reason: "no variable to differentiate with respect to was given",
            }));
        }

        self.steps = StepTree::new();
        self.memo.clear();
        self.stack.clear();
        self.depth = 0;
        self.visit_root(arena, id)
    }

    /// Differentiates the expression `n` times. The steps of the last differentiation are kept.
    ///
    /// Differentiation stops early once a derivative no longer contains the variable, since
    /// every later derivative is `0`, or once the derivatives start repeating, as they do for
    /// `sin(x)` or `exp(x)`.
    pub fn nth_derivative(&mut self, arena: &mut ExprArena, id: ExprId, n: usize) -> Result<ExprId, Error> {
        self.steps = StepTree::new();
        let mut seen = vec![id];
        for order in 0..n {
            let current = seen[order];
            if order > 0 && !arena.contains_var(current, self.var()) {
                trace!(order, "derivative is constant");
                return Ok(arena.num(0.0));
            }

            trace!(order, "differentiating");
            let next = self.differentiate(arena, current)?;
            if let Some(start) = seen.iter().position(|&prev| arena.eq_at(prev, next)) {
                let period = order + 1 - start;
                trace!(order, start, period, "derivatives repeat");
                return Ok(seen[start + (n - start) % period]);
            }
            seen.push(next);
        }
        Ok(seen[n])
    }

    /// Returns the variable, which [`Differentiator::differentiate`] checks is set.
    fn var(&self) -> &str {
        self.variable.as_deref().unwrap_or_default()
    }

    /// Differentiates an expression that has no enclosing expression.
    fn visit_root(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        // the memo holds the nested derivative of an unrelated variable, which is itself
        let unrelated = arena.as_variable(id).is_some_and(|name| name != self.var());
        if unrelated && self.memo.contains_key(&id) {
            return Ok(arena.num(0.0));
        }

        let outer = self.root.replace(id);
        let result = self.visit(arena, id);
        self.root = outer;
        result
    }

    /// Differentiates a node, creating its step and simplifying the result.
    fn visit(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        if let Some(&derivative) = self.memo.get(&id) {
            return Ok(derivative);
        }
        if self.depth >= self.max_depth {
            return Err(arena.error_at(id, RecursionLimitExceeded { max_depth: self.max_depth }));
        }

        let step = self.trace.then(|| self.steps.insert(id, self.stack.last().copied()));
        self.stack.extend(step);
        self.depth += 1;
        let result = self.derive(arena, id);
        self.depth -= 1;
        if step.is_some() {
            self.stack.pop();
        }

        let Derived { intermediate, derivative, rule } = result?;
        let simplified = self.simplifier.simplify(arena, derivative)?;
        if let Some(step) = step {
            let step = self.steps.get_mut(step);
            step.intermediate = Some(intermediate.unwrap_or(derivative));
            step.derivative = Some(simplified);
            step.rule = rule;
        }

        debug!(
            expr = %arena.node(id),
            derivative = %arena.node(simplified),
            ?rule,
            "differentiated"
        );
        self.memo.insert(id, simplified);
        Ok(simplified)
    }

    /// Applies the constant check, then the rule for the node.
    fn derive(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<Derived, Error> {
        let always_dispatch = matches!(
            arena.get(id),
            Expr::Variable(_) | Expr::Nary(NaryOp::Define { .. }, _),
        );
        if !always_dispatch && !arena.contains_var(id, self.var()) {
            return Ok(self.constant(arena));
        }
        arena.accept(id, self)
    }

    /// The derivative of a constant.
    fn constant(&self, arena: &mut ExprArena) -> Derived {
        Derived { intermediate: None, derivative: arena.num(0.0), rule: Rule::Constant }
    }

    /// Builds the derivative from the formula of a rule, given the children that were
    /// differentiated along with their derivatives.
    ///
    /// When a trace is recorded, the formula is also built with the derivatives of the children
    /// spelled out as `nderiv(f, x, 1)`, giving the intermediate form of the step.
    fn formula(
        &self,
        arena: &mut ExprArena,
        primes: &[(ExprId, ExprId)],
        rule: Rule,
        build: impl Fn(&mut ExprArena, &[ExprId]) -> ExprId,
    ) -> Derived {
        let intermediate = self.trace.then(|| self.intermediate(arena, primes, &build));
        let derivatives = primes.iter().map(|&(_, d)| d).collect::<Vec<_>>();
        Derived { intermediate, derivative: build(arena, &derivatives), rule }
    }

    /// Same as [`Differentiator::formula`], but builds the derivative before the intermediate
    /// form.
    fn formula_final_first(
        &self,
        arena: &mut ExprArena,
        primes: &[(ExprId, ExprId)],
        rule: Rule,
        build: impl Fn(&mut ExprArena, &[ExprId]) -> ExprId,
    ) -> Derived {
        let derivatives = primes.iter().map(|&(_, d)| d).collect::<Vec<_>>();
        let derivative = build(arena, &derivatives);
        let intermediate = self.trace.then(|| self.intermediate(arena, primes, &build));
        Derived { intermediate, derivative, rule }
    }

    fn intermediate(
        &self,
        arena: &mut ExprArena,
        primes: &[(ExprId, ExprId)],
        build: &impl Fn(&mut ExprArena, &[ExprId]) -> ExprId,
    ) -> ExprId {
        let placeholders = primes.iter()
            .map(|&(f, _)| {
                let var = arena.var(self.var());
                let one = arena.num(1.0);
                arena.mk_nary(NaryOp::NDerivative, vec![f, var, one])
            })
            .collect::<Vec<_>>();
        build(arena, &placeholders)
    }

    /// Returns [`Rule::Other`] if the node is the bare variable, and [`Rule::Chain`] otherwise.
    fn chain_rule(&self, arena: &ExprArena, inner: ExprId) -> Rule {
        if arena.as_variable(inner) == Some(self.var()) {
            Rule::Other
        } else {
            Rule::Chain
        }
    }

    /// `(f^g)'`
    fn power(&mut self, arena: &mut ExprArena, id: ExprId, f: ExprId, g: ExprId) -> Result<Derived, Error> {
        let f_dep = arena.contains_var(f, self.var());
        let g_dep = arena.contains_var(g, self.var());

        if !g_dep {
            // g * f^(g - 1) * f'
            let df = self.visit(arena, f)?;
            let is_power_rule = arena.as_variable(f) == Some(self.var());
            let rule = if is_power_rule { Rule::Power } else { Rule::Chain };
            return Ok(self.formula(arena, &[(f, df)], rule, |arena, d| {
                let exp = match arena.as_number(g) {
                    Some(n) => arena.num(n - 1.0),
                    None => {
                        let one = arena.num(1.0);
                        arena.sub(g, one)
                    },
                };
                let pow = arena.pow(f, exp);
                if is_power_rule {
                    arena.mul(g, pow)
                } else {
                    let scaled = arena.mul(d[0], g);
                    arena.mul(scaled, pow)
                }
            }));
        }

        if !f_dep {
            // f^g * ln(f) * g'
            let dg = self.visit(arena, g)?;
            let rule = self.chain_rule(arena, g);
            return Ok(self.formula(arena, &[(g, dg)], rule, |arena, d| {
                let ln = arena.call(UnaryOp::Ln, f);
                let scaled = arena.mul(id, ln);
                arena.mul(scaled, d[0])
            }));
        }

        // f^g * (g' * ln(f) + g * f' / f)
        let df = self.visit(arena, f)?;
        let dg = self.visit(arena, g)?;
        Ok(self.formula(arena, &[(f, df), (g, dg)], Rule::Chain, |arena, d| {
            let ln = arena.call(UnaryOp::Ln, f);
            let exp_term = arena.mul(d[1], ln);
            let scaled = arena.mul(g, d[0]);
            let base_term = arena.div(scaled, f);
            let sum = arena.add(exp_term, base_term);
            arena.mul(id, sum)
        }))
    }

    /// Differentiates `node` as if it were the node with id `id`, keeping the step of `id`.
    fn redispatch(&mut self, arena: &mut ExprArena, node: ExprId) -> Result<Derived, Error> {
        trace!(rewritten = %arena.node(node), "redispatching");
        arena.accept(node, self)
    }

    /// `(f(a, b, ...))'` for a user-defined function `f`, found by differentiating its body.
    fn user_function(&mut self, arena: &mut ExprArena, id: ExprId, name: &str, args: &[ExprId]) -> Result<Derived, Error> {
        let params = self.params.ok_or_else(|| arena.error_at(id, InvalidConfiguration {
            reason: "differentiating a user-defined function requires the context defining it",
        }))?;
        let func = params.get_func(name).ok_or_else(|| arena.error_at(id, UndefinedFunction {
            name: name.to_string(),
            suggestions: params.get_similar_funcs(name).into_iter().map(String::from).collect(),
        }))?;
        if func.params.len() != args.len() {
            return Err(arena.error_at(id, ArityError::new(name, func.params.len(), func.params.len(), args.len())));
        }

        let body = arena.import(&func.arena, func.body);
        let bindings = func.params.iter().cloned().zip(args.iter().copied()).collect::<HashMap<_, _>>();
        let expanded = arena.substitute_all(body, &bindings);
        let derivative = self.visit_root(arena, expanded)?;
        Ok(Derived { intermediate: None, derivative, rule: Rule::Other })
    }

    /// `nderiv(f, t, n[, a])'`: the inner derivative is found first, then differentiated.
    fn nested_derivative(&mut self, arena: &mut ExprArena, args: &[ExprId]) -> Result<Derived, Error> {
        let inner_var = arena.as_variable(args[1])
            .ok_or_else(|| arena.error_at(args[1], InvalidChild {
                reason: "expected a variable name here".to_string(),
            }))?
            .to_string();
        let order = arena.as_number(args[2])
            .filter(|n| n.fract() == 0.0 && *n >= 0.0)
            .ok_or_else(|| unsupported(arena, args[2], "a derivative whose order is not a literal integer"))?;

        let mut nested = Differentiator::new(inner_var.as_str())
            .with_trace(false)
            .with_max_depth(self.max_depth);
        nested.params = self.params;
        let inner = nested.nth_derivative(arena, args[0], order as usize)?;

        let rewritten = match args.get(3) {
            Some(&point) => arena.substitute(inner, &inner_var, point),
            None => inner,
        };
        let derivative = self.visit_root(arena, rewritten)?;
        Ok(Derived { intermediate: None, derivative, rule: Rule::Other })
    }
}

impl Analyzer for Differentiator<'_> {
    type Output = Result<Derived, Error>;

    fn number(&mut self, arena: &mut ExprArena, _: ExprId, _: f64) -> Self::Output {
        Ok(self.constant(arena))
    }

    /// The variable itself has derivative `1`. Any other variable is a constant: `0` when it is
    /// the whole expression (or the whole body of a called function), and left unchanged, as a
    /// constant factor, when it is nested inside one.
    fn variable(&mut self, arena: &mut ExprArena, id: ExprId, name: &str) -> Self::Output {
        let derivative = if name == self.var() {
            arena.num(1.0)
        } else if self.root == Some(id) {
            arena.num(0.0)
        } else {
            id
        };
        Ok(Derived { intermediate: None, derivative, rule: Rule::Variable })
    }

    fn boolean(&mut self, arena: &mut ExprArena, _: ExprId, _: bool) -> Self::Output {
        Ok(self.constant(arena))
    }

    fn complex(&mut self, arena: &mut ExprArena, _: ExprId, _: Complex64) -> Self::Output {
        Ok(self.constant(arena))
    }

    fn unary(&mut self, arena: &mut ExprArena, id: ExprId, op: UnaryOp, f: ExprId) -> Self::Output {
        match op {
            UnaryOp::Neg => {
                let df = self.visit(arena, f)?;
                Ok(self.formula(arena, &[(f, df)], Rule::Factor, |arena, d| arena.neg(d[0])))
            },
            UnaryOp::Sqrt | UnaryOp::Cbrt => {
                let exp = arena.num(if op == UnaryOp::Sqrt { 0.5 } else { 1.0 / 3.0 });
                let pow = arena.pow(f, exp);
                self.redispatch(arena, pow)
            },
            UnaryOp::Sign | UnaryOp::Round | UnaryOp::Floor | UnaryOp::Ceil => Ok(self.constant(arena)),
            UnaryOp::Factorial => Err(unsupported(arena, id, "a factorial")),
            UnaryOp::Not => Err(unsupported(arena, id, "a logical expression")),
            UnaryOp::Re | UnaryOp::Im | UnaryOp::Conj => Err(unsupported(arena, id, "a complex part")),
            UnaryOp::Transpose | UnaryOp::Det => Err(unsupported(arena, id, "a matrix operation")),
            _ => {
                let Some(outer) = outer_derivative(arena, op, f) else {
                    return Err(unsupported(arena, id, op.name()));
                };
                let df = self.visit(arena, f)?;
                let rule = self.chain_rule(arena, f);
                let build = |arena: &mut ExprArena, d: &[ExprId]| outer.apply(arena, d[0]);
                if op == UnaryOp::Arsech {
                    // `arsech` builds its derivative before the intermediate form
                    Ok(self.formula_final_first(arena, &[(f, df)], rule, build))
                } else {
                    Ok(self.formula(arena, &[(f, df)], rule, build))
                }
            },
        }
    }

    fn binary(&mut self, arena: &mut ExprArena, id: ExprId, op: BinaryOp, f: ExprId, g: ExprId) -> Self::Output {
        let f_dep = arena.contains_var(f, self.var());
        let g_dep = arena.contains_var(g, self.var());

        match op {
            BinaryOp::Add | BinaryOp::Sub => {
                let rule = if op == BinaryOp::Add { Rule::Sum } else { Rule::Difference };
                match (f_dep, g_dep) {
                    (true, true) => {
                        let df = self.visit(arena, f)?;
                        let dg = self.visit(arena, g)?;
                        Ok(self.formula(arena, &[(f, df), (g, dg)], rule, |arena, d| {
                            arena.mk_binary(op, d[0], d[1])
                        }))
                    },
                    (true, false) => {
                        let df = self.visit(arena, f)?;
                        Ok(self.formula(arena, &[(f, df)], rule, |_, d| d[0]))
                    },
                    _ => {
                        let dg = self.visit(arena, g)?;
                        Ok(self.formula(arena, &[(g, dg)], rule, |arena, d| {
                            if op == BinaryOp::Add { d[0] } else { arena.neg(d[0]) }
                        }))
                    },
                }
            },
            BinaryOp::Mul => match (f_dep, g_dep) {
                // f'g + fg'
                (true, true) => {
                    let df = self.visit(arena, f)?;
                    let dg = self.visit(arena, g)?;
                    Ok(self.formula(arena, &[(f, df), (g, dg)], Rule::Product, |arena, d| {
                        let lhs = arena.mul(d[0], g);
                        let rhs = arena.mul(f, d[1]);
                        arena.add(lhs, rhs)
                    }))
                },
                // cf'
                (true, false) => {
                    let df = self.visit(arena, f)?;
                    Ok(self.formula(arena, &[(f, df)], Rule::Factor, |arena, d| arena.mul(g, d[0])))
                },
                _ => {
                    let dg = self.visit(arena, g)?;
                    Ok(self.formula(arena, &[(g, dg)], Rule::Factor, |arena, d| arena.mul(f, d[0])))
                },
            },
            BinaryOp::Div => match (f_dep, g_dep) {
                // (f'g - fg') / g^2
                (true, true) => {
                    let df = self.visit(arena, f)?;
                    let dg = self.visit(arena, g)?;
                    Ok(self.formula(arena, &[(f, df), (g, dg)], Rule::Quotient, |arena, d| {
                        let lhs = arena.mul(d[0], g);
                        let rhs = arena.mul(f, d[1]);
                        let num = arena.sub(lhs, rhs);
                        let two = arena.num(2.0);
                        let den = arena.pow(g, two);
                        arena.div(num, den)
                    }))
                },
                // f' / g
                (true, false) => {
                    let df = self.visit(arena, f)?;
                    Ok(self.formula(arena, &[(f, df)], Rule::Factor, |arena, d| arena.div(d[0], g)))
                },
                // -fg' / g^2
                _ => {
                    let dg = self.visit(arena, g)?;
                    Ok(self.formula(arena, &[(g, dg)], Rule::Reciprocal, |arena, d| {
                        let product = arena.mul(f, d[0]);
                        let num = arena.neg(product);
                        let two = arena.num(2.0);
                        let den = arena.pow(g, two);
                        arena.div(num, den)
                    }))
                },
            },
            BinaryOp::Pow => self.power(arena, id, f, g),
            BinaryOp::Root => {
                // root(f, n) = f^(1/n)
                let exp = match arena.as_number(g) {
                    Some(n) => arena.num(n.recip()),
                    None => {
                        let one = arena.num(1.0);
                        arena.div(one, g)
                    },
                };
                let pow = arena.pow(f, exp);
                self.redispatch(arena, pow)
            },
            BinaryOp::Log => {
                // log(b, x) = ln(x) / ln(b)
                let num = arena.call(UnaryOp::Ln, g);
                let den = arena.call(UnaryOp::Ln, f);
                let quotient = arena.div(num, den);
                self.redispatch(arena, quotient)
            },
            BinaryOp::NPr | BinaryOp::NCr => Ok(self.constant(arena)),
            BinaryOp::Mod => Err(unsupported(arena, id, "a remainder")),
            op if op.is_comparison() => Err(unsupported(arena, id, "a comparison")),
            _ => Err(unsupported(arena, id, "a logical expression")),
        }
    }

    fn nary(&mut self, arena: &mut ExprArena, id: ExprId, op: &NaryOp, args: &[ExprId]) -> Self::Output {
        match op {
            NaryOp::Sum => {
                // the index shadows the variable inside the sum
                if arena.as_variable(args[1]) == Some(self.var()) {
                    return Ok(self.constant(arena));
                }
                if arena.contains_var(args[2], self.var()) || arena.contains_var(args[3], self.var()) {
                    return Err(unsupported(arena, id, "a sum whose bounds depend on the variable"));
                }
                let body = args[0];
                let d_body = self.visit(arena, body)?;
                Ok(self.formula(arena, &[(body, d_body)], Rule::Sum, |arena, d| {
                    arena.mk_nary(NaryOp::Sum, vec![d[0], args[1], args[2], args[3]])
                }))
            },
            NaryOp::Product => Err(unsupported(arena, id, "a product")),
            NaryOp::DefiniteIntegral | NaryOp::Rand => Ok(self.constant(arena)),
            NaryOp::NDerivative => self.nested_derivative(arena, args),
            NaryOp::Condition | NaryOp::MultiCondition => {
                // conditions sit at even positions, followed by their branch, with an optional
                // default branch at the end
                let mut branches = (1..args.len()).step_by(2).collect::<Vec<_>>();
                if args.len() % 2 == 1 {
                    branches.push(args.len() - 1);
                }
                let primes = branches.iter()
                    .map(|&i| self.visit(arena, args[i]).map(|d| (args[i], d)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.formula(arena, &primes, Rule::Other, |arena, d| {
                    let mut new_args = args.to_vec();
                    for (&i, &derivative) in branches.iter().zip(d) {
                        new_args[i] = derivative;
                    }
                    arena.mk_nary(op.clone(), new_args)
                }))
            },
            NaryOp::Vector | NaryOp::Matrix { .. } => Err(unsupported(arena, id, "a vector or matrix")),
            NaryOp::UserFunction { name, .. } => self.user_function(arena, id, name, args),
            NaryOp::Define { .. } => Err(unsupported(arena, id, "a definition")),
        }
    }
}

/// Differentiates the expression with respect to the variable, discarding the steps taken.
pub fn differentiate(arena: &mut ExprArena, id: ExprId, variable: &str) -> Result<ExprId, Error> {
    Differentiator::new(variable).with_trace(false).differentiate(arena, id)
}

/// Differentiates the expression `n` times with respect to the variable.
pub fn nth_derivative(arena: &mut ExprArena, id: ExprId, variable: &str, n: usize) -> Result<ExprId, Error> {
    Differentiator::new(variable).with_trace(false).nth_derivative(arena, id, n)
}

#[cfg(test)]
mod tests {
    use crate::error::DivisionByZero;
    use crate::numerical::{eval::Eval, value::Value};
    use pretty_assertions::assert_eq;
    use super::*;

    /// Differentiates the source with respect to `x` and prints the result.
    fn derivative(src: &str) -> String {
        let mut arena = ExprArena::new();
        let id = arena.parse(src).unwrap();
        let id = differentiate(&mut arena, id, "x").unwrap();
        arena.node(id).to_string()
    }

    /// Evaluates the expression with `x` bound to the given value.
    fn eval_x(arena: &ExprArena, id: ExprId, x: f64) -> f64 {
        let mut ctxt = Ctxt::default();
        ctxt.add_var("x", Value::Number(x));
        match arena.node(id).eval(&mut ctxt).unwrap() {
            Value::Number(n) => n,
            other => unreachable!("expected a number, got {}", other),
        }
    }

    /// Approximates the derivative of the expression at `x` with a forward difference.
    fn finite_difference(arena: &ExprArena, id: ExprId, x: f64) -> f64 {
        const DX: f64 = 0.00001;
        (eval_x(arena, id, x + DX) - eval_x(arena, id, x)) / DX
    }

    /// Checks the symbolic derivative of the function against a finite difference at each
    /// point.
    fn test_for_function(function: &'static str, points: impl IntoIterator<Item = f64>) {
        const TOL: f64 = 0.0001;

        let mut arena = ExprArena::new();
        let expr = arena.parse(function).unwrap();
        let symbolic = differentiate(&mut arena, expr, "x")
            .unwrap_or_else(|err| panic!("derivative of \"{function}\" failed: {err:?}"));

        for point in points {
            let symbolically_computed = eval_x(&arena, symbolic, point);
            let numerically_computed = finite_difference(&arena, expr, point);
            assert!(
                (symbolically_computed - numerically_computed).abs() < TOL * numerically_computed.abs().max(1.0),
                "For \"{function}\" at x={point}, symbolically computed derivative was {symbolically_computed} but numerically computed derivative was {numerically_computed}, which was out of tolerance {TOL}",
            );
        }
    }

    #[test]
    fn closed_forms() {
        assert_eq!(derivative("2*x"), "2");
        assert_eq!(derivative("x^2"), "2 * x");
        assert_eq!(derivative("sin(x)"), "cos(x)");
        assert_eq!(derivative("ln(2*x)"), "1 / x");
    }

    #[test]
    fn constants() {
        assert_eq!(derivative("5"), "0");
        assert_eq!(derivative("y"), "0");
        assert_eq!(derivative("y^2 + sin(y)"), "0");
        assert_eq!(derivative("sign(x)"), "0");
        assert_eq!(derivative("ncr(x, 2)"), "0");
        assert_eq!(derivative("integral(x, x, 0, 1)"), "0");
    }

    #[test]
    fn linear_rules() {
        assert_eq!(derivative("x + 1"), "1");
        assert_eq!(derivative("3 - x"), "-1");
        assert_eq!(derivative("x^2 + x"), "2 * x + 1");
        assert_eq!(derivative("-x"), "-1");
        assert_eq!(derivative("sum(k * x, k, 1, 3)"), "sum(k, k, 1, 3)");
    }

    #[test]
    fn power_rule() {
        test_for_function("x^2 + x + 1", [0., 1., 2., 5., 8.]);
        test_for_function("x^3 - 2x^2", [-2., 0.5, 3.]);
        test_for_function("sqrt(x)", [0.5, 1., 4.]);
        test_for_function("cbrt(x)", [0.5, 1., 8.]);
        test_for_function("root(x, 4)", [0.5, 2.]);
    }

    #[test]
    fn product_and_quotient_rules() {
        test_for_function("x * sin(x)", [0., 1., 2.]);
        test_for_function("x / (x + 1)", [0., 1., 3.]);
        test_for_function("2 / x", [0.5, 1., 3.]);
        test_for_function("sin(x) / 3", [0., 1., 2.]);
    }

    #[test]
    fn chain_rule() {
        test_for_function("sin(x^2)", [0., 0.5, 1.]);
        test_for_function("exp(2x)", [0., 1.]);
        test_for_function("(3x + 1)^4", [-1., 0., 0.5]);
        test_for_function("ln(x^2 + 1)", [0., 1., 2.]);
    }

    #[test]
    fn exponents() {
        test_for_function("2^x", [0., 1., 3.]);
        test_for_function("x^x", [0.5, 1., 2.]);
        test_for_function("e^x", [0., 1.]);
        test_for_function("log(2, x)", [0.5, 1., 4.]);
        test_for_function("log(x, 10)", [0.5, 2., 4.]);
        test_for_function("lg(x) + lb(x)", [0.5, 3.]);
    }

    #[test]
    fn trigonometric_functions() {
        test_for_function("tan(x) + cot(x)", [0.5, 1.]);
        test_for_function("sec(x) + csc(x)", [0.5, 1.]);
        test_for_function("arcsin(x) + arccos(x) + arctan(x)", [-0.5, 0., 0.5]);
        test_for_function("arccot(x) + arcsec(x) + arccsc(x)", [1.5, 3.]);
    }

    #[test]
    fn hyperbolic_functions() {
        test_for_function("sinh(x) + cosh(x) + tanh(x)", [-1., 0., 1.]);
        test_for_function("coth(x) + sech(x) + csch(x)", [0.5, 2.]);
        test_for_function("arsinh(x) + artanh(x)", [-0.5, 0.5]);
        test_for_function("arcosh(x) + arcoth(x)", [1.5, 3.]);
        test_for_function("arsech(x) + arcsch(x)", [0.25, 0.5]);
    }

    #[test]
    fn abs() {
        test_for_function("abs(x^3 - 1)", [-1., 0.5, 2.]);
    }

    #[test]
    fn nested_variables_are_constant_factors() {
        let mut arena = ExprArena::new();
        let id = arena.parse("if(x > 0, y, 2x)").unwrap();
        let id = differentiate(&mut arena, id, "x").unwrap();
        assert_eq!(arena.node(id).to_string(), "if(x > 0, y, 2)");
    }

    #[test]
    fn conditions() {
        assert_eq!(derivative("if(x > 0, x^2, -x)"), "if(x > 0, 2 * x, -1)");
        assert_eq!(
            derivative("piecewise(x < 0, -x, x < 1, x^2, 1)"),
            "piecewise(x < 0, -1, x < 1, 2 * x, 0)",
        );
    }

    #[test]
    fn user_functions() {
        let mut ctxt = Ctxt::default();
        let mut arena = ExprArena::new();
        let def = arena.parse("f(t) = t^3").unwrap();
        arena.node(def).eval(&mut ctxt).unwrap();

        let call = arena.parse_with("f(2x)", &ctxt).unwrap();
        let derivative = Differentiator::new("x")
            .with_params(&ctxt)
            .differentiate(&mut arena, call)
            .unwrap();
        assert_float_eq::assert_float_absolute_eq!(eval_x(&arena, derivative, 1.0), 24.0);

        let err = Differentiator::new("x").differentiate(&mut arena, call).unwrap_err();
        assert!(err.is::<InvalidConfiguration>());
    }

    #[test]
    fn unrelated_function_bodies_are_constant() {
        let mut ctxt = Ctxt::default();
        let mut arena = ExprArena::new();
        for def in ["f(t) = y", "g(t) = t * y"] {
            let def = arena.parse(def).unwrap();
            arena.node(def).eval(&mut ctxt).unwrap();
        }

        let mut differentiator = Differentiator::new("x").with_params(&ctxt);
        let call = arena.parse_with("f(x)", &ctxt).unwrap();
        let derivative = differentiator.differentiate(&mut arena, call).unwrap();
        assert_eq!(arena.node(derivative).to_string(), "0");

        // nested inside the body, `y` is a constant factor
        let call = arena.parse_with("g(x)", &ctxt).unwrap();
        let derivative = differentiator.differentiate(&mut arena, call).unwrap();
        assert_eq!(arena.node(derivative).to_string(), "y");
    }

    #[test]
    fn nested_derivatives() {
        assert_eq!(derivative("nderiv(x^3, x, 1)"), "6 * x");
        assert_eq!(derivative("nderiv(x^3, x, 2, 1)"), "0");
        assert_eq!(derivative("nderiv(t^2 * x, t, 1)"), "2 * t");
        assert_eq!(derivative("nderiv(t * y + x, t, 1)"), "0");
    }

    #[test]
    fn huge_orders_finish() {
        assert_eq!(derivative("nderiv(x, x, 100000000)"), "0");

        let mut arena = ExprArena::new();
        let id = arena.parse("x^3 + 2x").unwrap();
        let derivative = nth_derivative(&mut arena, id, "x", 100_000_000).unwrap();
        assert_eq!(arena.get(derivative), &Expr::Number(0.0));
    }

    #[test]
    fn repeating_derivatives() {
        let mut arena = ExprArena::new();
        let id = arena.parse("exp(x)").unwrap();
        let derivative = nth_derivative(&mut arena, id, "x", 1_000_000_000).unwrap();
        assert_eq!(arena.node(derivative).to_string(), "exp(x)");

        let id = arena.parse("sin(x)").unwrap();
        let second = nth_derivative(&mut arena, id, "x", 2).unwrap();
        let far = nth_derivative(&mut arena, id, "x", 1_000_000_002).unwrap();
        assert!(arena.eq_at(second, far), "{} != {}", arena.node(second), arena.node(far));
    }

    #[test]
    fn nth_derivatives() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x^4").unwrap();
        let second = nth_derivative(&mut arena, id, "x", 2).unwrap();
        assert_eq!(arena.node(second).to_string(), "12 * x^2");
        assert_eq!(nth_derivative(&mut arena, id, "x", 0).unwrap(), id);
    }

    #[test]
    fn unsupported_nodes() {
        for src in ["x!", "x % 2", "x < 1", "[x, 1]", "product(x, k, 1, 3)", "a = x"] {
            let mut arena = ExprArena::new();
            let id = arena.parse(src).unwrap();
            let err = differentiate(&mut arena, id, "x").unwrap_err();
            assert!(err.is::<UnsupportedOperation>(), "{} did not fail as unsupported", src);
        }
    }

    #[test]
    fn missing_variable() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x^2").unwrap();
        let err = Differentiator::default().differentiate(&mut arena, id).unwrap_err();
        assert!(err.is::<InvalidConfiguration>());
    }

    #[test]
    fn simplifier_errors_propagate() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x / 0").unwrap();
        let err = differentiate(&mut arena, id, "x").unwrap_err();
        assert!(err.is::<DivisionByZero>());
    }

    #[test]
    fn recursion_limit() {
        let mut arena = ExprArena::new();
        let id = arena.parse("sin(sin(sin(sin(x))))").unwrap();
        let err = Differentiator::new("x")
            .with_max_depth(3)
            .differentiate(&mut arena, id)
            .unwrap_err();
        assert!(err.is::<RecursionLimitExceeded>());
    }

    #[test]
    fn step_tree() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x^2 + 3x").unwrap();
        let mut differentiator = Differentiator::new("x");
        let derivative = differentiator.differentiate(&mut arena, id).unwrap();
        assert_eq!(arena.node(derivative).to_string(), "2 * x + 3");

        let steps = differentiator.steps();
        let root = differentiator.root_step().unwrap();
        assert_eq!(root.expr, id);
        assert_eq!(root.rule, Rule::Sum);
        assert_eq!(root.parent, None);
        assert_eq!(root.derivative, Some(derivative));
        assert_eq!(
            arena.node(root.intermediate.unwrap()).to_string(),
            "nderiv(x^2, x, 1) + nderiv(3 * x, x, 1)",
        );

        let rules = root.substeps.iter().map(|&s| steps.get(s).rule).collect::<Vec<_>>();
        assert_eq!(rules, vec![Rule::Power, Rule::Factor]);

        let power = steps.get(root.substeps[0]);
        assert_eq!(power.parent, steps.root());
        assert_eq!(steps.step_for(power.expr), Some(root.substeps[0]));
    }

    #[test]
    fn step_tree_display() {
        let mut arena = ExprArena::new();
        let id = arena.parse("sin(x^2)").unwrap();
        let mut differentiator = Differentiator::new("x");
        differentiator.differentiate(&mut arena, id).unwrap();
        assert_eq!(
            differentiator.steps().display(&arena, "x"),
            "d/dx sin(x^2) = 2 * x * cos(x^2)  [chain rule]\n  d/dx x^2 = 2 * x  [power rule]\n    d/dx x = 1  [variable]\n",
        );
    }

    #[test]
    fn without_trace() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x^2").unwrap();
        let mut differentiator = Differentiator::new("x").with_trace(false);
        differentiator.differentiate(&mut arena, id).unwrap();
        assert!(differentiator.steps().is_empty());
    }
}
