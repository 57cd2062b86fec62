use crate::{
    error::{ArityError, DomainError, InvalidChild, UndefinedFunction, UnsupportedOperation},
    numerical::{ctxt::{Ctxt, IntegrationMethod}, value::Value},
    symbolic::{
        derivative::Differentiator,
        expr::{op::{BinaryOp, NaryOp}, ExprArena, ExprId, ExprRef},
    },
};
use rand::Rng;
use symcalc_error::Error;
use super::{binary, Eval};

fn domain_error(op: &NaryOp, reason: impl Into<String>) -> Error {
    Error::spanless(DomainError { function: op.name().to_string(), reason: reason.into() })
}

/// Evaluates the argument to a real number.
fn real_arg(node: &ExprRef, op: &NaryOp, arg: ExprId, ctxt: &mut Ctxt) -> Result<f64, Error> {
    let value = node.with(arg).eval(ctxt)?;
    value.as_number().ok_or_else(|| {
        node.arena.error_at(arg, DomainError {
            function: op.name().to_string(),
            reason: format!("expected a real number, found a {}", value.typename()),
        })
    })
}

/// Evaluates the argument to an integer.
fn integer_arg(node: &ExprRef, op: &NaryOp, arg: ExprId, ctxt: &mut Ctxt) -> Result<i64, Error> {
    let n = real_arg(node, op, arg, ctxt)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(node.arena.error_at(arg, DomainError {
            function: op.name().to_string(),
            reason: format!("expected an integer, found {}", n),
        }));
    }
    Ok(n as i64)
}

/// Returns the name of the variable bound by `sum`, `product`, `integral` and `nderiv`.
fn bound_var<'a>(node: &ExprRef<'a>, arg: ExprId) -> Result<&'a str, Error> {
    node.arena.as_variable(arg).ok_or_else(|| {
        node.arena.error_at(arg, InvalidChild {
            reason: "expected a variable name here".to_string(),
        })
    })
}

/// Evaluates `body` with `var` bound to `value`, restoring the previous binding afterwards.
fn eval_bound(node: &ExprRef, body: ExprId, var: &str, value: Value, ctxt: &mut Ctxt) -> Result<Value, Error> {
    let saved = ctxt.bind_vars(vec![(var.to_string(), value)]);
    let result = node.with(body).eval(ctxt);
    ctxt.restore_vars(saved);
    result
}

/// Evaluates a `sum` or `product` over an inclusive integer range.
fn sum_or_product(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    let var = bound_var(node, args[1])?;
    let from = integer_arg(node, op, args[2], ctxt)?;
    let to = integer_arg(node, op, args[3], ctxt)?;
    let (combine, identity) = match op {
        NaryOp::Sum => (BinaryOp::Add, 0.0),
        _ => (BinaryOp::Mul, 1.0),
    };

    let mut acc: Option<Value> = None;
    for k in from..=to {
        let value = eval_bound(node, args[0], var, Value::Number(k as f64), ctxt)?;
        acc = Some(match acc {
            Some(acc) => binary::apply(combine, acc, value)?,
            None => value,
        });
    }
    Ok(acc.unwrap_or(Value::Number(identity)))
}

/// Integrates `f` over `[a, b]` with the given method.
fn integrate(
    method: IntegrationMethod,
    a: f64,
    b: f64,
    mut f: impl FnMut(f64) -> Result<f64, Error>,
) -> Result<f64, Error> {
    let n = method.subdivisions();
    let h = (b - a) / n as f64;
    match method {
        IntegrationMethod::Simpson => {
            let mut total = f(a)? + f(b)?;
            for i in 1..n {
                let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
                total += weight * f(a + i as f64 * h)?;
            }
            Ok(total * h / 3.0)
        },
        IntegrationMethod::Rectangle => {
            let mut total = 0.0;
            for i in 0..n {
                total += f(a + (i as f64 + 0.5) * h)?;
            }
            Ok(total * h)
        },
    }
}

/// Evaluates a definite integral numerically.
fn integral(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    let var = bound_var(node, args[1])?;
    let a = real_arg(node, op, args[2], ctxt)?;
    let b = real_arg(node, op, args[3], ctxt)?;
    let method = ctxt.integration;

    let saved = ctxt.bind_vars(vec![(var.to_string(), Value::Number(a))]);
    let result = integrate(method, a, b, |x| {
        ctxt.add_var(var, Value::Number(x));
        let value = node.with(args[0]).eval(ctxt)?;
        value.as_number().ok_or_else(|| Error::spanless(UnsupportedOperation {
            operation: format!("integrate a function with {} values", value.typename()),
        }))
    });
    ctxt.restore_vars(saved);
    result.map(Value::Number)
}

/// Evaluates the derivative of the body, found symbolically, at a point.
fn derivative(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    let var = bound_var(node, args[1])?;
    let order = integer_arg(node, op, args[2], ctxt)?;
    if order < 0 {
        return Err(node.arena.error_at(args[2], DomainError {
            function: op.name().to_string(),
            reason: format!("the order must be non-negative, found {}", order),
        }));
    }

    let mut scratch = ExprArena::new();
    let body = scratch.import(node.arena, args[0]);
    let derivative = Differentiator::new(var)
        .with_params(&*ctxt)
        .with_max_depth(ctxt.max_depth)
        .nth_derivative(&mut scratch, body, order as usize)?;

    match args.get(3) {
        Some(&point) => {
            let point = node.with(point).eval(ctxt)?;
            let saved = ctxt.bind_vars(vec![(var.to_string(), point)]);
            let result = scratch.node(derivative).eval(ctxt);
            ctxt.restore_vars(saved);
            result
        },
        None => scratch.node(derivative).eval(ctxt),
    }
}

/// Evaluates the first branch whose condition holds. Only the chosen branch is evaluated.
fn condition(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    let mut pairs = args.chunks_exact(2);
    for pair in pairs.by_ref() {
        match node.with(pair[0]).eval(ctxt)? {
            Value::Boolean(true) => return node.with(pair[1]).eval(ctxt),
            Value::Boolean(false) => continue,
            other => return Err(node.arena.error_at(pair[0], DomainError {
                function: op.name().to_string(),
                reason: format!("the condition must be a boolean, found a {}", other.typename()),
            })),
        }
    }

    match pairs.remainder() {
        [otherwise] => node.with(*otherwise).eval(ctxt),
        _ => Ok(Value::Unit),
    }
}

/// Generates a uniformly distributed random number in `[min, max)`.
fn random(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    let (min, max) = match args {
        [] => (0.0, 1.0),
        [max] => (0.0, real_arg(node, op, *max, ctxt)?),
        [min, max, ..] => (real_arg(node, op, *min, ctxt)?, real_arg(node, op, *max, ctxt)?),
    };
    if min >= max {
        return Err(domain_error(op, format!("the range {} to {} is empty", min, max)));
    }
    Ok(Value::Number(rand::thread_rng().gen_range(min..max)))
}

/// Evaluates the elements of a vector or matrix.
fn elements(node: &ExprRef, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Vec<f64>, Error> {
    args.iter()
        .map(|&arg| {
            let value = node.with(arg).eval(ctxt)?;
            value.as_number().ok_or_else(|| node.arena.error_at(arg, UnsupportedOperation {
                operation: format!("store a {} inside a vector or matrix", value.typename()),
            }))
        })
        .collect()
}

/// Calls a user-defined function. The arguments are evaluated before any parameter is bound.
fn call(name: &str, args: &[ExprId], node: &ExprRef, ctxt: &mut Ctxt) -> Result<Value, Error> {
    let func = ctxt.get_func_arc(name).ok_or_else(|| Error::spanless(UndefinedFunction {
        name: name.to_string(),
        suggestions: ctxt.get_similar_funcs(name).into_iter().map(String::from).collect(),
    }))?;
    if func.params.len() != args.len() {
        return Err(Error::spanless(ArityError::new(name, func.params.len(), func.params.len(), args.len())));
    }

    let values = args.iter()
        .map(|&arg| node.with(arg).eval(ctxt))
        .collect::<Result<Vec<_>, _>>()?;

    let saved = ctxt.bind_vars(func.params.iter().cloned().zip(values).collect());
    let result = func.arena.node(func.body).eval(ctxt);
    ctxt.restore_vars(saved);
    result
}

/// Evaluates an n-ary node.
pub fn eval(node: &ExprRef, op: &NaryOp, args: &[ExprId], ctxt: &mut Ctxt) -> Result<Value, Error> {
    match op {
        NaryOp::Sum | NaryOp::Product => sum_or_product(node, op, args, ctxt),
        NaryOp::DefiniteIntegral => integral(node, op, args, ctxt),
        NaryOp::NDerivative => derivative(node, op, args, ctxt),
        NaryOp::Condition | NaryOp::MultiCondition => condition(node, op, args, ctxt),
        NaryOp::Rand => random(node, op, args, ctxt),
        NaryOp::Vector => elements(node, args, ctxt).map(Value::Vector),
        NaryOp::Matrix { rows, cols } => elements(node, args, ctxt)
            .map(|data| Value::Matrix { rows: *rows, cols: *cols, data }),
        NaryOp::UserFunction { name, .. } => call(name, args, node, ctxt),
        NaryOp::Define { name, params } if params.is_empty() => {
            let value = node.with(args[0]).eval(ctxt)?;
            ctxt.add_var(name, value.clone());
            Ok(value)
        },
        NaryOp::Define { name, params } => {
            ctxt.add_func(name, params.clone(), node.arena, args[0]);
            Ok(Value::Unit)
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RecursionLimitExceeded;
    use crate::symbolic::expr::ExprArena;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn vector_sums() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sum([k, 1], k, 1, 3)").unwrap();
        assert_eq!(arena.node(expr).eval_default().unwrap(), Value::Vector(vec![6.0, 3.0]));
    }

    #[test]
    fn bounds_must_be_integers() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sum(k, k, 1.5, 3)").unwrap();
        let err = arena.node(expr).eval_default().unwrap_err();
        assert!(err.is::<DomainError>());
        assert_eq!(err.spans, vec![10..13]);
    }

    #[test]
    fn derivative_at_each_sample() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("integral(nderiv(t^2, t, 1, u), u, 0, 1)").unwrap();
        match arena.node(expr).eval_default().unwrap() {
            Value::Number(n) => assert_float_eq::assert_float_absolute_eq!(n, 1.0, 1e-6),
            other => panic!("expected a number, got {}", other),
        }
    }

    #[test]
    fn derivative_honours_recursion_limit() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("nderiv(x + x + x + x + x + x, x, 1, 0)").unwrap();
        assert_eq!(arena.node(expr).eval_default().unwrap(), Value::Number(6.0));

        let mut ctxt = Ctxt::default();
        ctxt.max_depth = 4;
        let err = arena.node(expr).eval(&mut ctxt).unwrap_err();
        assert!(err.is::<RecursionLimitExceeded>());
    }

    #[test]
    fn function_arguments_use_caller_bindings() {
        let mut ctxt = Ctxt::default();
        let mut arena = ExprArena::new();
        let def = arena.parse("f(x, y) = x - y").unwrap();
        arena.node(def).eval(&mut ctxt).unwrap();
        ctxt.add_var("x", Value::Number(10.0));
        ctxt.add_var("y", Value::Number(4.0));

        // `f(y, x)` must see the caller's `y` and `x`, not the freshly bound parameters
        let call = arena.parse("f(y, x)").unwrap();
        assert_eq!(arena.node(call).eval(&mut ctxt).unwrap(), Value::Number(-6.0));
        assert_eq!(ctxt.get_var("x"), Some(Value::Number(10.0)));
    }
}
