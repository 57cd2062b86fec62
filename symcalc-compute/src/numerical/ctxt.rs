use crate::{consts, symbolic::expr::{ExprArena, ExprId}};
use levenshtein::levenshtein;
use std::{collections::HashMap, sync::Arc};
use super::{trig_mode::TrigMode, value::Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// The default maximum recursion depth of a context, used to detect runaway recursion.
pub const MAX_RECURSION_DEPTH: usize = 512;

/// The numerical method used to evaluate definite integrals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
#[repr(u8)]
pub enum IntegrationMethod {
    /// Simpson's rule.
    #[default]
    Simpson,

    /// The midpoint rectangle rule.
    Rectangle,
}

impl IntegrationMethod {
    /// Returns the number of subintervals the integration range is split into.
    pub fn subdivisions(self) -> usize {
        match self {
            IntegrationMethod::Simpson => 10000,
            IntegrationMethod::Rectangle => 1000,
        }
    }
}

/// A user-defined function.
///
/// The body lives in an arena of its own, so the function outlives the arena it was defined in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuncDef {
    /// The names of the parameters.
    pub params: Vec<String>,

    /// The arena holding the body.
    pub arena: ExprArena,

    /// The root of the body.
    pub body: ExprId,
}

/// A context to use when evaluating an expression, containing variables and functions that can be
/// used within the expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ctxt {
    /// The variables in the context.
    vars: HashMap<String, Value>,

    /// The functions in the context.
    funcs: HashMap<String, Arc<FuncDef>>,

    /// The trigonometric mode of the context.
    pub trig_mode: TrigMode,

    /// The method used for definite integrals.
    pub integration: IntegrationMethod,

    /// The maximum depth of nested evaluations before evaluation fails.
    pub max_depth: usize,

    /// The current depth of the stack.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) stack_depth: usize,
}

impl Default for Ctxt {
    fn default() -> Self {
        Self {
            vars: HashMap::from([
                ("i".to_string(), Value::Complex(*consts::I)),
                ("e".to_string(), Value::Number(consts::E)),
                ("phi".to_string(), Value::Number(*consts::PHI)),
                ("pi".to_string(), Value::Number(consts::PI)),
                ("tau".to_string(), Value::Number(consts::TAU)),
            ]),
            funcs: HashMap::new(),
            trig_mode: TrigMode::default(),
            integration: IntegrationMethod::default(),
            max_depth: MAX_RECURSION_DEPTH,
            stack_depth: 0,
        }
    }
}

impl Ctxt {
    /// Creates a new empty context.
    ///
    /// The empty context does not even contain constants like `pi`. Consider using the
    /// [`Default`] implementation instead.
    pub fn new() -> Ctxt {
        Ctxt {
            vars: HashMap::new(),
            ..Default::default()
        }
    }

    /// Add a variable to the context, replacing any previous value.
    pub fn add_var(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Get the value of a variable in the context.
    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    /// Removes a variable from the context, returning its value.
    pub fn remove_var(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    /// Returns the variables in the context.
    pub fn get_vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// Add a function to the context. The body is copied out of the given arena.
    pub fn add_func(&mut self, name: &str, params: Vec<String>, arena: &ExprArena, body: ExprId) {
        let mut own_arena = ExprArena::new();
        let body = own_arena.import(arena, body);
        self.funcs.insert(name.to_string(), Arc::new(FuncDef {
            params,
            arena: own_arena,
            body,
        }));
    }

    /// Get a function in the context.
    pub fn get_func(&self, name: &str) -> Option<&FuncDef> {
        self.funcs.get(name).map(Arc::as_ref)
    }

    /// Get a shared handle to a function in the context.
    pub(crate) fn get_func_arc(&self, name: &str) -> Option<Arc<FuncDef>> {
        self.funcs.get(name).cloned()
    }

    /// Returns the functions in the context.
    pub fn get_funcs(&self) -> &HashMap<String, Arc<FuncDef>> {
        &self.funcs
    }

    /// Returns all functions in the context with a name similar to the given name.
    pub fn get_similar_funcs(&self, name: &str) -> Vec<&str> {
        let mut similar = self.funcs
            .keys()
            .filter(|n| levenshtein(n, name) < 2)
            .map(String::as_str)
            .collect::<Vec<_>>();
        similar.sort_unstable();
        similar
    }

    /// Binds the variables to the given values, returning their previous values so they can be
    /// restored with [`Ctxt::restore_vars`].
    pub(crate) fn bind_vars(&mut self, bindings: Vec<(String, Value)>) -> Vec<(String, Option<Value>)> {
        bindings.into_iter()
            .map(|(name, value)| {
                let old = self.vars.insert(name.clone(), value);
                (name, old)
            })
            .collect()
    }

    /// Restores variables saved by [`Ctxt::bind_vars`].
    pub(crate) fn restore_vars(&mut self, saved: Vec<(String, Option<Value>)>) {
        for (name, old) in saved.into_iter().rev() {
            match old {
                Some(value) => self.vars.insert(name, value),
                None => self.vars.remove(&name),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constants() {
        let ctxt = Ctxt::default();
        assert_eq!(ctxt.get_var("pi"), Some(Value::Number(consts::PI)));
        assert!(matches!(ctxt.get_var("i"), Some(Value::Complex(_))));
        assert!(Ctxt::new().get_var("pi").is_none());
    }

    #[test]
    fn bind_and_restore() {
        let mut ctxt = Ctxt::new();
        ctxt.add_var("x", Value::Number(1.0));
        let saved = ctxt.bind_vars(vec![
            ("x".to_string(), Value::Number(2.0)),
            ("y".to_string(), Value::Number(3.0)),
        ]);
        assert_eq!(ctxt.get_var("x"), Some(Value::Number(2.0)));
        ctxt.restore_vars(saved);
        assert_eq!(ctxt.get_var("x"), Some(Value::Number(1.0)));
        assert_eq!(ctxt.get_var("y"), None);
    }

    #[test]
    fn similar_funcs() {
        let mut ctxt = Ctxt::new();
        let mut arena = ExprArena::new();
        let body = arena.var("x");
        ctxt.add_func("square", vec!["x".to_string()], &arena, body);
        ctxt.add_func("squares", vec!["x".to_string()], &arena, body);
        ctxt.add_func("cube", vec!["x".to_string()], &arena, body);
        assert_eq!(ctxt.get_similar_funcs("squar"), vec!["square"]);
        assert_eq!(ctxt.get_similar_funcs("squarez"), vec!["square", "squares"]);
    }
}
