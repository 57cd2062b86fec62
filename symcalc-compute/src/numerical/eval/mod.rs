mod binary;
mod nary;
mod unary;

use crate::{
    error::{RecursionLimitExceeded, UndefinedVariable},
    symbolic::expr::{Expr, ExprRef},
};
use symcalc_error::Error;
use super::{ctxt::Ctxt, result_type::ResultType, value::Value};

pub(crate) use binary::apply as apply_binary;
pub(crate) use unary::apply as apply_unary;

/// Any type that can be evaluated to produce a value.
pub trait Eval {
    /// Evaluate the expression to produce a value, using the given context.
    fn eval(&self, ctxt: &mut Ctxt) -> Result<Value, Error>;

    /// Evaluate the expression to produce a value, using the default context.
    fn eval_default(&self) -> Result<Value, Error> {
        self.eval(&mut Default::default())
    }
}

impl Eval for ExprRef<'_> {
    fn eval(&self, ctxt: &mut Ctxt) -> Result<Value, Error> {
        if ctxt.stack_depth >= ctxt.max_depth {
            return Err(self.arena.error_at(self.id, RecursionLimitExceeded { max_depth: ctxt.max_depth }));
        }

        ctxt.stack_depth += 1;
        let result = self.eval_node(ctxt);
        ctxt.stack_depth -= 1;

        result.map_err(|err| match self.arena.span(self.id) {
            Some(span) => err.or_span(span),
            None => err,
        })
    }
}

impl ExprRef<'_> {
    /// Evaluates the root node, after the depth check.
    fn eval_node(&self, ctxt: &mut Ctxt) -> Result<Value, Error> {
        match self.expr() {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Complex(c) => Ok(Value::Complex(*c)),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Variable(name) => ctxt.get_var(name)
                .ok_or_else(|| Error::spanless(UndefinedVariable { name: name.clone() })),
            Expr::Unary(op, operand) => {
                let value = self.with(*operand).eval(ctxt)?;
                ResultType::unary(*op, value.result_type())?;
                unary::apply(*op, value, ctxt.trig_mode)
            },
            Expr::Binary(op, lhs, rhs) => {
                let left = self.with(*lhs).eval(ctxt)?;
                let right = self.with(*rhs).eval(ctxt)?;
                ResultType::binary(*op, left.result_type(), right.result_type())?;
                binary::apply(*op, left, right).map_err(|err| match self.arena.span(*rhs) {
                    // point at the divisor
                    Some(span) if binary::is_division_error(&err) => err.or_span(span),
                    _ => err,
                })
            },
            Expr::Nary(op, args) => nary::eval(self, op, args, ctxt),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use crate::{
        consts::PI,
        error::{DivisionByZero, DomainError, InvalidBinaryOperation, RecursionLimitExceeded, ShapeMismatch, UndefinedFunction, UndefinedVariable},
        numerical::trig_mode::TrigMode,
        symbolic::expr::ExprArena,
    };
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;
    use super::*;

    /// Evaluates the source code with the given context.
    fn eval_with(src: &str, ctxt: &mut Ctxt) -> Result<Value, Error> {
        let mut arena = ExprArena::new();
        let expr = arena.parse(src).unwrap();
        arena.node(expr).eval(ctxt)
    }

    /// Evaluates the source code with the default context.
    fn eval(src: &str) -> Result<Value, Error> {
        eval_with(src, &mut Ctxt::default())
    }

    /// Evaluates the source code to a real number.
    fn eval_num(src: &str) -> f64 {
        match eval(src).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected a number, got {}", other),
        }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("2 + 3").unwrap(), Value::Number(5.0));
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Number(7.0));
        assert_eq!(eval("3 * -5 / 5! + 6").unwrap(), Value::Number(5.875));
        assert_eq!(eval("2^3^2").unwrap(), Value::Number(512.0));
        assert_eq!(eval("-7 % 3").unwrap(), Value::Number(2.0));
        assert_eq!(eval("2x").unwrap_err().downcast_ref::<UndefinedVariable>().unwrap().name, "x");
    }

    #[test]
    fn programmatic_tree() {
        let mut arena = ExprArena::new();
        let two = arena.num(2.0);
        let three = arena.num(3.0);
        let sum = arena.binary(crate::symbolic::expr::op::BinaryOp::Add, two, three).unwrap();
        assert_eq!(arena.node(sum).eval(&mut Ctxt::new()).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn division_by_zero() {
        let mut ctxt = Ctxt::new();
        ctxt.add_var("x", Value::Number(4.0));
        let err = eval_with("x / (2 - 2)", &mut ctxt).unwrap_err();
        assert!(err.is::<DivisionByZero>());
        assert_eq!(err.spans, vec![5..10]);

        assert!(eval("0 / 0").unwrap_err().is::<DomainError>());
        assert!(eval("5 % 0").unwrap_err().is::<DivisionByZero>());
        assert!(eval("[1, 2] / 0").unwrap_err().is::<DivisionByZero>());
    }

    #[test]
    fn domain_errors() {
        assert!(eval("sqrt(-1)").unwrap_err().is::<DomainError>());
        assert!(eval("ln(0)").unwrap_err().is::<DomainError>());
        assert!(eval("log(1, 5)").unwrap_err().is::<DomainError>());
        assert!(eval("arcsin(2)").unwrap_err().is::<DomainError>());
        assert!(eval("(-8)^0.5").unwrap_err().is::<DomainError>());
        assert!(eval("2.5!").unwrap_err().is::<DomainError>());
        assert_float_absolute_eq!(eval_num("root(-8, 3)"), -2.0);
    }

    #[test]
    fn functions() {
        assert_float_absolute_eq!(eval_num("sin(pi / 2)"), 1.0);
        assert_float_absolute_eq!(eval_num("log(2, 8)"), 3.0);
        assert_float_absolute_eq!(eval_num("lg(1000)"), 3.0);
        assert_float_absolute_eq!(eval_num("arccot(1)"), PI / 4.0);
        assert_float_absolute_eq!(eval_num("arsech(0.5)"), (2.0f64 + 3f64.sqrt()).ln());
        assert_eq!(eval_num("npr(5, 2)"), 20.0);
        assert_eq!(eval_num("ncr(5, 2)"), 10.0);
        assert_eq!(eval_num("sign(-3) + round(2.5) + floor(-0.5) + ceil(0.2)"), 2.0);
    }

    #[test]
    fn trig_modes() {
        let mut ctxt = Ctxt::default();
        ctxt.trig_mode = TrigMode::Degrees;
        let value = eval_with("sin(30)", &mut ctxt).unwrap();
        assert!(value.approx_eq(&Value::Number(0.5), 1e-12));
        let value = eval_with("arctan(1)", &mut ctxt).unwrap();
        assert!(value.approx_eq(&Value::Number(45.0), 1e-12));

        ctxt.trig_mode = TrigMode::Gradians;
        let value = eval_with("cos(200)", &mut ctxt).unwrap();
        assert!(value.approx_eq(&Value::Number(-1.0), 1e-12));
    }

    #[test]
    fn complex_numbers() {
        assert_eq!(eval("i * i").unwrap(), Value::Number(-1.0));
        assert_eq!(eval("(1 + 2i) * 2").unwrap(), Value::Complex(Complex64::new(2.0, 4.0)));
        assert_eq!(eval("abs(3 + 4i)").unwrap(), Value::Number(5.0));
        assert_eq!(eval("conj(1 + i)").unwrap(), Value::Complex(Complex64::new(1.0, -1.0)));
        let value = eval("sqrt(2i)").unwrap();
        assert!(value.approx_eq(&Value::Complex(Complex64::new(1.0, 1.0)), 1e-12));
        let value = eval("e^(i * pi)").unwrap();
        assert!(value.approx_eq(&Value::Number(-1.0), 1e-12));
    }

    #[test]
    fn booleans() {
        assert_eq!(eval("1 < 2 and not (3 == 4)").unwrap(), Value::Boolean(true));
        assert_eq!(eval("true xor true").unwrap(), Value::Boolean(false));
        assert!(eval("1 and true").unwrap_err().is::<InvalidBinaryOperation>());
    }

    #[test]
    fn vectors_and_matrices() {
        assert_eq!(eval("[1, 2] + [3, 4]").unwrap(), Value::Vector(vec![4.0, 6.0]));
        assert_eq!(eval("2 * [1, 2]").unwrap(), Value::Vector(vec![2.0, 4.0]));
        assert_eq!(eval("[1, 2] * [3, 4]").unwrap(), Value::Number(11.0));
        assert_eq!(
            eval("[[1, 2], [3, 4]] * [[0, 1], [1, 0]]").unwrap(),
            Value::Matrix { rows: 2, cols: 2, data: vec![2.0, 1.0, 4.0, 3.0] },
        );
        assert_eq!(eval("[[1, 2], [3, 4]] * [1, 1]").unwrap(), Value::Vector(vec![3.0, 7.0]));
        assert_eq!(
            eval("transpose([[1, 2, 3], [4, 5, 6]])").unwrap(),
            Value::Matrix { rows: 3, cols: 2, data: vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0] },
        );
        assert_float_absolute_eq!(eval_num("det([[1, 2], [3, 4]])"), -2.0);
        assert_float_absolute_eq!(eval_num("det([[2, 0, 1], [1, 3, 2], [1, 1, 2]])"), 6.0);
        assert_eq!(eval("abs([3, 4])").unwrap(), Value::Number(5.0));
        assert!(eval("[1, 2] + [1, 2, 3]").unwrap_err().is::<ShapeMismatch>());
        assert!(eval("[[1, 2], [3, 4]] * [1, 2, 3]").unwrap_err().is::<ShapeMismatch>());
    }

    #[test]
    fn sums_products_and_integrals() {
        assert_eq!(eval_num("sum(k^2, k, 1, 4)"), 30.0);
        assert_eq!(eval_num("product(k, k, 1, 5)"), 120.0);
        assert_eq!(eval_num("sum(k, k, 5, 1)"), 0.0);
        assert_float_absolute_eq!(eval_num("integral(x^2, x, 0, 3)"), 9.0, 1e-6);

        let mut ctxt = Ctxt::default();
        ctxt.integration = crate::numerical::ctxt::IntegrationMethod::Rectangle;
        let value = eval_with("integral(sin(x), x, 0, pi)", &mut ctxt).unwrap();
        assert!(value.approx_eq(&Value::Number(2.0), 1e-5));

        // the index does not leak out of the sum
        let mut ctxt = Ctxt::new();
        ctxt.add_var("k", Value::Number(-1.0));
        eval_with("sum(k, k, 1, 3)", &mut ctxt).unwrap();
        assert_eq!(ctxt.get_var("k"), Some(Value::Number(-1.0)));
    }

    #[test]
    fn numerical_derivatives() {
        let mut ctxt = Ctxt::default();
        assert_float_absolute_eq!(eval_with("nderiv(x^3, x, 1, 2)", &mut ctxt).unwrap().as_number().unwrap(), 12.0);
        assert_float_absolute_eq!(eval_with("nderiv(x^3, x, 2, 2)", &mut ctxt).unwrap().as_number().unwrap(), 12.0);
        ctxt.add_var("x", Value::Number(3.0));
        assert_float_absolute_eq!(eval_with("nderiv(sin(x), x, 0)", &mut ctxt).unwrap().as_number().unwrap(), 3f64.sin());
        assert!(eval_with("nderiv(x, x, -1)", &mut ctxt).unwrap_err().is::<DomainError>());
    }

    #[test]
    fn conditions() {
        let mut ctxt = Ctxt::default();
        ctxt.add_var("x", Value::Number(-2.0));
        assert_eq!(eval_with("if(x > 0, x, -x)", &mut ctxt).unwrap(), Value::Number(2.0));
        assert_eq!(eval_with("if(x > 0, x)", &mut ctxt).unwrap(), Value::Unit);
        assert_eq!(eval_with("piecewise(x < -5, 1, x < 0, 2, 3)", &mut ctxt).unwrap(), Value::Number(2.0));
        assert_eq!(eval_with("piecewise(x > 5, 1, x > 0, 2)", &mut ctxt).unwrap(), Value::Unit);

        // the untaken branch is never evaluated
        assert_eq!(eval_with("if(x < 0, 1, 1 / 0)", &mut ctxt).unwrap(), Value::Number(1.0));
        assert!(eval_with("if(1, 2, 3)", &mut ctxt).unwrap_err().is::<DomainError>());
    }

    #[test]
    fn random_numbers() {
        for _ in 0..20 {
            let n = eval_num("rand(2, 3)");
            assert!((2.0..3.0).contains(&n));
        }
        assert!(eval("rand(3, 2)").unwrap_err().is::<DomainError>());
    }

    #[test]
    fn definitions() {
        let mut ctxt = Ctxt::default();
        assert_eq!(eval_with("a = 2 * 3", &mut ctxt).unwrap(), Value::Number(6.0));
        assert_eq!(eval_with("f(x, y) = x * y + a", &mut ctxt).unwrap(), Value::Unit);
        assert_eq!(eval_with("f(2, 5)", &mut ctxt).unwrap(), Value::Number(16.0));

        // parameters do not leak out of the call
        assert!(ctxt.get_var("x").is_none());

        let err = eval_with("g(2)", &mut ctxt).unwrap_err();
        assert!(err.is::<UndefinedFunction>());
        let err = eval_with("ff(2, 1)", &mut ctxt).unwrap_err();
        assert_eq!(err.downcast_ref::<UndefinedFunction>().unwrap().suggestions, vec!["f".to_string()]);
        assert!(eval_with("f(1)", &mut ctxt).unwrap_err().is::<crate::error::ArityError>());
    }

    #[test]
    fn recursion_limit() {
        let mut ctxt = Ctxt::default();
        ctxt.max_depth = 64;
        eval_with("f(n) = f(n - 1) + 1", &mut ctxt).unwrap();
        let err = eval_with("f(3)", &mut ctxt).unwrap_err();
        assert!(err.is::<RecursionLimitExceeded>());
        assert_eq!(ctxt.stack_depth, 0);

        eval_with("fact(n) = if(n <= 1, 1, n * fact(n - 1))", &mut ctxt).unwrap();
        assert_eq!(eval_with("fact(5)", &mut ctxt).unwrap(), Value::Number(120.0));
    }
}
