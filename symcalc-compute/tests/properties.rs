use assert_float_eq::*;
use pretty_assertions::assert_eq;
use symcalc_compute::error::{ArityError, DivisionByZero};
use symcalc_compute::numerical::{ctxt::Ctxt, eval::Eval, value::Value};
use symcalc_compute::symbolic::{
    differentiate,
    expr::{op::{BinaryOp, NaryOp}, Expr, ExprArena, ExprId},
    simplify,
};

/// Parses the source into a fresh arena.
fn parse(src: &str) -> (ExprArena, ExprId) {
    let mut arena = ExprArena::new();
    let id = arena.parse(src).unwrap();
    (arena, id)
}

/// Evaluates the expression with `x` bound to the given value.
fn eval_at(arena: &ExprArena, id: ExprId, x: f64) -> f64 {
    let mut ctxt = Ctxt::default();
    ctxt.add_var("x", Value::Number(x));
    match arena.node(id).eval(&mut ctxt).unwrap() {
        Value::Number(n) => n,
        other => panic!("expected a number, got {}", other),
    }
}

#[test]
fn simplification_is_idempotent() {
    for src in [
        "x + 0",
        "0 * x",
        "2x + 3x",
        "x * x / x^3",
        "(x + 1) * 2 - 2",
        "ln(e) + lg(10) * y",
        "-(-(x * 3)) / 3",
        "sqrt(16) + cbrt(x)",
        "2^3 * x^0 + sin(arcsin(y))",
        "if(x > 1, x + x, 0 * y)",
    ] {
        let (mut arena, id) = parse(src);
        let once = simplify(&mut arena, id).unwrap();
        let twice = simplify(&mut arena, once).unwrap();
        assert!(
            arena.eq_at(once, twice),
            "simplifying {} twice gave {} then {}",
            src,
            arena.node(once),
            arena.node(twice),
        );
    }
}

#[test]
fn constants_have_zero_derivative() {
    for src in ["7", "y", "y^2 + 3y", "sin(a) * cos(b)", "ln(2) / pi", "[1, 2]", "true"] {
        let (mut arena, id) = parse(src);
        let derivative = differentiate(&mut arena, id, "x").unwrap();
        assert_eq!(arena.get(derivative), &Expr::Number(0.0), "derivative of {}", src);
    }
}

#[test]
fn differentiation_is_linear() {
    let pairs = [
        ("x^3", "sin(x)"),
        ("exp(2x)", "x * ln(x)"),
        ("1 / x", "sqrt(x + 1)"),
        ("arctan(x)", "x^x"),
    ];
    for (f, g) in pairs {
        let mut arena = ExprArena::new();
        let f = arena.parse(f).unwrap();
        let g = arena.parse(g).unwrap();
        let sum = arena.binary(BinaryOp::Add, f, g).unwrap();

        let d_sum = differentiate(&mut arena, sum, "x").unwrap();
        let d_f = differentiate(&mut arena, f, "x").unwrap();
        let d_g = differentiate(&mut arena, g, "x").unwrap();

        for x in [0.5, 1.0, 2.5] {
            let expected = eval_at(&arena, d_f, x) + eval_at(&arena, d_g, x);
            assert_float_relative_eq!(eval_at(&arena, d_sum, x), expected, 1e-9);
        }
    }
}

#[test]
fn closed_forms() {
    let derivative = |src: &str| {
        let (mut arena, id) = parse(src);
        let id = differentiate(&mut arena, id, "x").unwrap();
        arena.node(id).to_string()
    };
    assert_eq!(derivative("2*x"), "2");
    assert_eq!(derivative("x^2"), "2 * x");
    assert_eq!(derivative("sin(x)"), "cos(x)");
    assert_eq!(derivative("ln(2*x)"), "1 / x");

    let simplified = |src: &str| {
        let (mut arena, id) = parse(src);
        let id = simplify(&mut arena, id).unwrap();
        arena.node(id).to_string()
    };
    assert_eq!(simplified("x + 0"), "x");
    assert_eq!(simplified("0 * x"), "0");
    assert_eq!(simplified("(2*x) + (3*x)"), "5 * x");
}

#[test]
fn evaluate_sum() {
    let mut arena = ExprArena::new();
    let two = arena.num(2.0);
    let three = arena.num(3.0);
    let sum = arena.binary(BinaryOp::Add, two, three).unwrap();
    assert_eq!(arena.node(sum).eval(&mut Ctxt::new()).unwrap(), Value::Number(5.0));
}

#[test]
fn nary_nodes_check_their_arity() {
    let mut arena = ExprArena::new();
    let x = arena.var("x");
    let k = arena.var("k");
    let one = arena.num(1.0);

    for (op, args) in [
        (NaryOp::Sum, vec![x, k, one]),
        (NaryOp::DefiniteIntegral, vec![x, x, one, one, one]),
        (NaryOp::NDerivative, vec![x, x]),
        (NaryOp::Condition, vec![x]),
        (NaryOp::Matrix { rows: 2, cols: 2 }, vec![x, x, x]),
    ] {
        let err = arena.nary(op.clone(), args).unwrap_err();
        assert!(err.is::<ArityError>(), "{:?} accepted the wrong number of arguments", op);
    }
    assert!(arena.nary(NaryOp::Sum, vec![x, k, one, one]).is_ok());
}

#[test]
fn clones_are_independent() {
    let (mut arena, original) = parse("x * (y + 1)");
    let copy = arena.deep_clone(original);
    assert!(arena.eq_at(original, copy));

    let Expr::Binary(_, _, sum) = *arena.get(copy) else {
        panic!("expected a product");
    };
    let z = arena.var("z");
    let replacement = arena.binary(BinaryOp::Sub, z, z).unwrap();
    let replacement = arena.get(replacement).clone();
    // the replacement refers to `z`, which was inserted after `sum`
    assert!(arena.replace(sum, replacement).is_err());

    let Expr::Binary(_, y, _) = *arena.get(sum) else {
        panic!("expected a sum");
    };
    arena.replace(sum, Expr::Binary(BinaryOp::Mul, y, y)).unwrap();

    assert_eq!(arena.node(copy).to_string(), "x * (y * y)");
    assert_eq!(arena.node(original).to_string(), "x * (y + 1)");
}

#[test]
fn division_by_zero() {
    let (arena, id) = parse("x / 0");
    let mut ctxt = Ctxt::default();
    ctxt.add_var("x", Value::Number(3.0));
    let err = arena.node(id).eval(&mut ctxt).unwrap_err();
    assert!(err.is::<DivisionByZero>());
    assert_eq!(err.spans, vec![4..5]);

    // `x` is never evaluated, so it does not need a value
    let (mut arena, id) = parse("0 / x");
    let id = simplify(&mut arena, id).unwrap();
    assert_eq!(arena.get(id), &Expr::Number(0.0));
}
