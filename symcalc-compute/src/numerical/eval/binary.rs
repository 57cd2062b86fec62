use crate::{
    error::{DivisionByZero, DomainError, InvalidBinaryOperation, ShapeMismatch},
    numerical::value::Value,
    symbolic::expr::op::BinaryOp,
};
use num_complex::Complex64;
use symcalc_error::Error;

fn domain_error(op: BinaryOp, reason: impl Into<String>) -> Error {
    Error::spanless(DomainError { function: op.symbol().to_string(), reason: reason.into() })
}

fn invalid(op: BinaryOp, lhs: &Value, rhs: &Value) -> Error {
    Error::spanless(InvalidBinaryOperation { op, left: lhs.typename(), right: rhs.typename() })
}

fn shape_mismatch(lhs: &Value, rhs: &Value) -> Error {
    Error::spanless(ShapeMismatch {
        left: lhs.result_type().to_string(),
        right: rhs.result_type().to_string(),
    })
}

/// Returns true if the error came from dividing by zero, in which case the divisor is the most
/// useful thing to point at.
pub fn is_division_error(err: &Error) -> bool {
    err.is::<DivisionByZero>()
        || err.downcast_ref::<DomainError>()
            .map_or(false, |err| err.function == BinaryOp::Div.symbol())
}

/// Checks that the number is a non-negative integer, as required by `npr` and `ncr`.
fn count(op: BinaryOp, n: f64) -> Result<u64, Error> {
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(domain_error(op, format!("expected a non-negative integer, found {}", n)));
    }
    Ok(n as u64)
}

/// Applies an operator to two real numbers.
fn real(op: BinaryOp, x: f64, y: f64) -> Result<Value, Error> {
    let n = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => {
            if y == 0.0 {
                return Err(if x == 0.0 {
                    domain_error(op, "0 / 0 is indeterminate")
                } else {
                    Error::spanless(DivisionByZero)
                });
            }
            x / y
        },
        BinaryOp::Mod => {
            if y == 0.0 {
                return Err(Error::spanless(DivisionByZero));
            }
            x.rem_euclid(y)
        },
        BinaryOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(Error::spanless(DivisionByZero));
            }
            let n = x.powf(y);
            if n.is_nan() && !x.is_nan() && !y.is_nan() {
                return Err(domain_error(op, format!("{} cannot be raised to the power of {}", x, y)));
            }
            n
        },
        BinaryOp::Log => {
            if x <= 0.0 || x == 1.0 {
                return Err(domain_error(op, format!("the base must be positive and not 1, found {}", x)));
            }
            if y <= 0.0 {
                return Err(domain_error(op, format!("the argument must be positive, found {}", y)));
            }
            y.ln() / x.ln()
        },
        BinaryOp::Root => {
            if y == 0.0 {
                return Err(domain_error(op, "the zeroth root is undefined"));
            }
            if x < 0.0 {
                if y.fract() == 0.0 && y.rem_euclid(2.0) == 1.0 {
                    -(-x).powf(y.recip())
                } else {
                    return Err(domain_error(op, format!("{} has no real root of degree {}", x, y)));
                }
            } else {
                x.powf(y.recip())
            }
        },
        BinaryOp::NPr | BinaryOp::NCr => {
            let (n, k) = (count(op, x)?, count(op, y)?);
            if k > n {
                return Err(domain_error(op, format!("cannot choose {} items out of {}", k, n)));
            }
            if op == BinaryOp::NPr {
                (n - k + 1..=n).fold(1.0, |acc, i| acc * i as f64)
            } else {
                let k = k.min(n - k);
                (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
            }
        },
        BinaryOp::Eq => return Ok(Value::Boolean(x == y)),
        BinaryOp::NotEq => return Ok(Value::Boolean(x != y)),
        BinaryOp::Less => return Ok(Value::Boolean(x < y)),
        BinaryOp::LessEq => return Ok(Value::Boolean(x <= y)),
        BinaryOp::Greater => return Ok(Value::Boolean(x > y)),
        BinaryOp::GreaterEq => return Ok(Value::Boolean(x >= y)),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            return Err(invalid(op, &Value::Number(x), &Value::Number(y)));
        },
    };
    Ok(Value::Number(n))
}

/// Applies an operator to two numbers where at least one is complex.
fn complex(op: BinaryOp, z: Complex64, w: Complex64) -> Result<Value, Error> {
    let zero = Complex64::new(0.0, 0.0);
    let result = match op {
        BinaryOp::Add => z + w,
        BinaryOp::Sub => z - w,
        BinaryOp::Mul => z * w,
        BinaryOp::Div => {
            if w == zero {
                return Err(if z == zero {
                    domain_error(op, "0 / 0 is indeterminate")
                } else {
                    Error::spanless(DivisionByZero)
                });
            }
            z / w
        },
        BinaryOp::Pow => {
            if z == zero {
                if w == zero {
                    Complex64::new(1.0, 0.0)
                } else if w.re > 0.0 {
                    zero
                } else {
                    return Err(Error::spanless(DivisionByZero));
                }
            } else {
                z.powc(w)
            }
        },
        BinaryOp::Log => {
            if z == zero || w == zero || z == Complex64::new(1.0, 0.0) {
                return Err(domain_error(op, "the base and argument must be non-zero, and the base cannot be 1"));
            }
            w.ln() / z.ln()
        },
        BinaryOp::Root => {
            if w == zero {
                return Err(domain_error(op, "the zeroth root is undefined"));
            }
            z.powc(w.inv())
        },
        BinaryOp::Eq => return Ok(Value::Boolean(z == w)),
        BinaryOp::NotEq => return Ok(Value::Boolean(z != w)),
        _ => return Err(invalid(op, &Value::Complex(z), &Value::Complex(w))),
    };
    Ok(Value::Complex(result).coerce_number())
}

/// Combines two lists of the same length elementwise.
fn elementwise(
    op: BinaryOp,
    a: Vec<f64>,
    b: Vec<f64>,
) -> Result<Vec<f64>, Error> {
    a.into_iter()
        .zip(b)
        .map(|(x, y)| match real(op, x, y)? {
            Value::Number(n) => Ok(n),
            other => Err(invalid(op, &other, &Value::Number(y))),
        })
        .collect()
}

/// Applies an operator between every element of the list and a scalar. The scalar is on the
/// right if `scalar_right` is set.
fn scale(op: BinaryOp, list: Vec<f64>, scalar: f64, scalar_right: bool) -> Result<Vec<f64>, Error> {
    if scalar_right && op == BinaryOp::Div && scalar == 0.0 {
        return Err(Error::spanless(DivisionByZero));
    }
    list.into_iter()
        .map(|x| {
            let (l, r) = if scalar_right { (x, scalar) } else { (scalar, x) };
            match real(op, l, r)? {
                Value::Number(n) => Ok(n),
                other => Err(invalid(op, &other, &Value::Number(r))),
            }
        })
        .collect()
}

/// Multiplies a `rows x inner` matrix by an `inner x cols` matrix.
fn mat_mul(a: &[f64], b: &[f64], rows: usize, inner: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[r * cols + c] = (0..inner).map(|k| a[r * inner + k] * b[k * cols + c]).sum();
        }
    }
    out
}

/// Applies the binary operator to two values whose types were already checked against the
/// operator.
pub fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, Error> {
    use Value::*;

    match (lhs, rhs) {
        (Boolean(a), Boolean(b)) => match op {
            BinaryOp::And => Ok(Boolean(a && b)),
            BinaryOp::Or => Ok(Boolean(a || b)),
            BinaryOp::Xor => Ok(Boolean(a ^ b)),
            BinaryOp::Eq => Ok(Boolean(a == b)),
            BinaryOp::NotEq => Ok(Boolean(a != b)),
            _ => Err(invalid(op, &Boolean(a), &Boolean(b))),
        },
        (Number(x), Number(y)) => real(op, x, y),
        (lhs @ (Number(_) | Complex(_)), rhs @ (Number(_) | Complex(_))) => {
            match (lhs.as_complex(), rhs.as_complex()) {
                (Some(z), Some(w)) => complex(op, z, w),
                _ => Err(invalid(op, &lhs, &rhs)),
            }
        },

        (Vector(a), Vector(b)) => {
            if a.len() != b.len() {
                return Err(shape_mismatch(&Vector(a), &Vector(b)));
            }
            match op {
                BinaryOp::Add | BinaryOp::Sub => elementwise(op, a, b).map(Vector),
                BinaryOp::Mul => Ok(Number(a.iter().zip(&b).map(|(x, y)| x * y).sum())),
                BinaryOp::Eq => Ok(Boolean(a == b)),
                BinaryOp::NotEq => Ok(Boolean(a != b)),
                _ => Err(invalid(op, &Vector(a), &Vector(b))),
            }
        },
        (Number(x), Vector(v)) if op == BinaryOp::Mul => scale(op, v, x, false).map(Vector),
        (Vector(v), Number(x)) if matches!(op, BinaryOp::Mul | BinaryOp::Div) => {
            scale(op, v, x, true).map(Vector)
        },

        (
            Matrix { rows: r1, cols: c1, data: a },
            Matrix { rows: r2, cols: c2, data: b },
        ) => {
            let lhs_shape = (r1, c1);
            let rhs_shape = (r2, c2);
            match op {
                BinaryOp::Add | BinaryOp::Sub if lhs_shape == rhs_shape => {
                    elementwise(op, a, b).map(|data| Matrix { rows: r1, cols: c1, data })
                },
                BinaryOp::Mul if c1 == r2 => Ok(Matrix {
                    rows: r1,
                    cols: c2,
                    data: mat_mul(&a, &b, r1, c1, c2),
                }),
                BinaryOp::Eq => Ok(Boolean(lhs_shape == rhs_shape && a == b)),
                BinaryOp::NotEq => Ok(Boolean(lhs_shape != rhs_shape || a != b)),
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => Err(shape_mismatch(
                    &Matrix { rows: r1, cols: c1, data: a },
                    &Matrix { rows: r2, cols: c2, data: b },
                )),
                _ => Err(invalid(
                    op,
                    &Matrix { rows: r1, cols: c1, data: a },
                    &Matrix { rows: r2, cols: c2, data: b },
                )),
            }
        },
        (Matrix { rows, cols, data }, Vector(v)) if op == BinaryOp::Mul => {
            if cols != v.len() {
                return Err(shape_mismatch(&Matrix { rows, cols, data }, &Vector(v)));
            }
            Ok(Vector(mat_mul(&data, &v, rows, cols, 1)))
        },
        (Number(x), Matrix { rows, cols, data }) if op == BinaryOp::Mul => {
            scale(op, data, x, false).map(|data| Matrix { rows, cols, data })
        },
        (Matrix { rows, cols, data }, Number(x)) if matches!(op, BinaryOp::Mul | BinaryOp::Div) => {
            scale(op, data, x, true).map(|data| Matrix { rows, cols, data })
        },

        (Unit, Unit) if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) => {
            Ok(Boolean(op == BinaryOp::Eq))
        },
        (lhs, rhs) => Err(invalid(op, &lhs, &rhs)),
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use crate::numerical::value::Value::*;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn exact_combinatorics() {
        assert_eq!(apply(BinaryOp::NPr, Number(10.0), Number(3.0)).unwrap(), Number(720.0));
        assert_eq!(apply(BinaryOp::NCr, Number(52.0), Number(5.0)).unwrap(), Number(2598960.0));
        assert_eq!(apply(BinaryOp::NCr, Number(4.0), Number(0.0)).unwrap(), Number(1.0));
        assert!(apply(BinaryOp::NCr, Number(2.0), Number(3.0)).unwrap_err().is::<DomainError>());
        assert!(apply(BinaryOp::NPr, Number(2.5), Number(1.0)).unwrap_err().is::<DomainError>());
    }

    #[test]
    fn powers_and_roots() {
        assert!(apply(BinaryOp::Pow, Number(0.0), Number(-1.0)).unwrap_err().is::<DivisionByZero>());
        assert_eq!(apply(BinaryOp::Pow, Number(0.0), Number(0.0)).unwrap(), Number(1.0));
        assert!(apply(BinaryOp::Root, Number(-16.0), Number(4.0)).unwrap_err().is::<DomainError>());
        match apply(BinaryOp::Root, Number(27.0), Number(3.0)).unwrap() {
            Number(n) => assert_float_absolute_eq!(n, 3.0),
            other => panic!("expected a number, got {}", other),
        }
    }

    #[test]
    fn division_errors_point_at_divisor() {
        let err = apply(BinaryOp::Div, Number(0.0), Number(0.0)).unwrap_err();
        assert!(is_division_error(&err));
        let err = apply(BinaryOp::Div, Number(1.0), Number(0.0)).unwrap_err();
        assert!(is_division_error(&err));
        let err = apply(BinaryOp::Log, Number(1.0), Number(2.0)).unwrap_err();
        assert!(!is_division_error(&err));
    }

    #[test]
    fn equality_across_number_kinds() {
        let z = Complex(Complex64::new(2.0, 0.0));
        assert_eq!(apply(BinaryOp::Eq, Number(2.0), z).unwrap(), Boolean(true));
        assert_eq!(apply(BinaryOp::NotEq, Unit, Unit).unwrap(), Boolean(false));
    }
}
