use crate::{
    consts::FRAC_PI_2,
    error::{DomainError, InvalidUnaryOperation},
    numerical::{trig_mode::TrigMode, value::Value},
    symbolic::expr::op::UnaryOp,
};
use num_complex::Complex64;
use symcalc_error::Error;

fn domain_error(op: UnaryOp, reason: String) -> Error {
    Error::spanless(DomainError { function: op.name().to_string(), reason })
}

/// Applies a real-valued function. A finite input that produces a non-finite output is outside
/// the domain of the function.
fn real(op: UnaryOp, x: f64, trig_mode: TrigMode) -> Result<f64, Error> {
    let angle = if op.takes_angle() { trig_mode.to_radians(x) } else { x };

    let y = match op {
        UnaryOp::Neg => -x,
        UnaryOp::Abs => x.abs(),
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Cbrt => x.cbrt(),
        UnaryOp::Exp => x.exp(),
        UnaryOp::Ln => x.ln(),
        UnaryOp::Lg => x.log10(),
        UnaryOp::Lb => x.log2(),
        UnaryOp::Sin => angle.sin(),
        UnaryOp::Cos => angle.cos(),
        UnaryOp::Tan => angle.tan(),
        UnaryOp::Cot => angle.tan().recip(),
        UnaryOp::Sec => angle.cos().recip(),
        UnaryOp::Csc => angle.sin().recip(),
        UnaryOp::Arcsin => x.asin(),
        UnaryOp::Arccos => x.acos(),
        UnaryOp::Arctan => x.atan(),
        UnaryOp::Arccot => FRAC_PI_2 - x.atan(),
        UnaryOp::Arcsec => x.recip().acos(),
        UnaryOp::Arccsc => x.recip().asin(),
        UnaryOp::Sinh => x.sinh(),
        UnaryOp::Cosh => x.cosh(),
        UnaryOp::Tanh => x.tanh(),
        UnaryOp::Coth => x.tanh().recip(),
        UnaryOp::Sech => x.cosh().recip(),
        UnaryOp::Csch => x.sinh().recip(),
        UnaryOp::Arsinh => x.asinh(),
        UnaryOp::Arcosh => x.acosh(),
        UnaryOp::Artanh => x.atanh(),
        UnaryOp::Arcoth => x.recip().atanh(),
        UnaryOp::Arsech => x.recip().acosh(),
        UnaryOp::Arcsch => x.recip().asinh(),
        UnaryOp::Sign => if x == 0.0 { 0.0 } else { x.signum() },
        UnaryOp::Round => x.round(),
        UnaryOp::Floor => x.floor(),
        UnaryOp::Ceil => x.ceil(),
        UnaryOp::Re | UnaryOp::Conj => x,
        UnaryOp::Im => 0.0,
        UnaryOp::Factorial => factorial(x)?,
        UnaryOp::Not | UnaryOp::Transpose | UnaryOp::Det => {
            return Err(Error::spanless(InvalidUnaryOperation { op, operand: "number" }));
        },
    };

    if x.is_finite() && !y.is_finite() {
        return Err(domain_error(op, format!("{} is outside the domain of `{}`", x, op.name())));
    }

    Ok(if op.returns_angle() { trig_mode.from_radians(y) } else { y })
}

/// Applies a function to a complex number.
fn complex(op: UnaryOp, z: Complex64, trig_mode: TrigMode) -> Result<Value, Error> {
    let one = Complex64::new(1.0, 0.0);
    let angle = if op.takes_angle() { z * trig_mode.to_radians(1.0) } else { z };

    let w = match op {
        UnaryOp::Neg => -z,
        UnaryOp::Abs => return Ok(Value::Number(z.norm())),
        UnaryOp::Re => return Ok(Value::Number(z.re)),
        UnaryOp::Im => return Ok(Value::Number(z.im)),
        UnaryOp::Conj => z.conj(),
        UnaryOp::Sqrt => z.sqrt(),
        UnaryOp::Cbrt => z.cbrt(),
        UnaryOp::Exp => z.exp(),
        UnaryOp::Ln => z.ln(),
        UnaryOp::Lg => z.log10(),
        UnaryOp::Lb => z.log2(),
        UnaryOp::Sin => angle.sin(),
        UnaryOp::Cos => angle.cos(),
        UnaryOp::Tan => angle.tan(),
        UnaryOp::Cot => one / angle.tan(),
        UnaryOp::Sec => one / angle.cos(),
        UnaryOp::Csc => one / angle.sin(),
        UnaryOp::Arcsin => z.asin(),
        UnaryOp::Arccos => z.acos(),
        UnaryOp::Arctan => z.atan(),
        UnaryOp::Arccot => (one / z).atan(),
        UnaryOp::Arcsec => (one / z).acos(),
        UnaryOp::Arccsc => (one / z).asin(),
        UnaryOp::Sinh => z.sinh(),
        UnaryOp::Cosh => z.cosh(),
        UnaryOp::Tanh => z.tanh(),
        UnaryOp::Coth => one / z.tanh(),
        UnaryOp::Sech => one / z.cosh(),
        UnaryOp::Csch => one / z.sinh(),
        UnaryOp::Arsinh => z.asinh(),
        UnaryOp::Arcosh => z.acosh(),
        UnaryOp::Artanh => z.atanh(),
        UnaryOp::Arcoth => (one / z).atanh(),
        UnaryOp::Arsech => (one / z).acosh(),
        UnaryOp::Arcsch => (one / z).asinh(),
        UnaryOp::Sign => if z.norm() == 0.0 { z } else { z / z.norm() },
        UnaryOp::Round => Complex64::new(z.re.round(), z.im.round()),
        UnaryOp::Floor => Complex64::new(z.re.floor(), z.im.floor()),
        UnaryOp::Ceil => Complex64::new(z.re.ceil(), z.im.ceil()),
        UnaryOp::Factorial | UnaryOp::Not | UnaryOp::Transpose | UnaryOp::Det => {
            return Err(Error::spanless(InvalidUnaryOperation { op, operand: "complex" }));
        },
    };

    if z.is_finite() && !w.is_finite() {
        return Err(domain_error(op, format!("{} is outside the domain of `{}`", Value::Complex(z), op.name())));
    }

    let w = if op.returns_angle() { w / trig_mode.to_radians(1.0) } else { w };
    Ok(Value::Complex(w).coerce_number())
}

/// Computes `n!` for a non-negative integer `n`.
fn factorial(n: f64) -> Result<f64, Error> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(domain_error(
            UnaryOp::Factorial,
            format!("the factorial is only defined for non-negative integers, not {}", n),
        ));
    }
    if n > 170.0 {
        // overflows `f64`
        return Ok(f64::INFINITY);
    }
    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

/// Returns the determinant of a square matrix stored in row-major order, using Gaussian
/// elimination with partial pivoting.
fn determinant(n: usize, mut data: Vec<f64>) -> f64 {
    let mut det = 1.0;
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| data[a * n + col].abs().total_cmp(&data[b * n + col].abs()))
            .unwrap_or(col);
        if data[pivot * n + col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            for k in 0..n {
                data.swap(pivot * n + k, col * n + k);
            }
            det = -det;
        }

        let p = data[col * n + col];
        det *= p;
        for row in col + 1..n {
            let factor = data[row * n + col] / p;
            for k in col..n {
                data[row * n + k] -= factor * data[col * n + k];
            }
        }
    }
    det
}

/// Applies the unary operator to a value whose type was already checked against the operator.
pub fn apply(op: UnaryOp, value: Value, trig_mode: TrigMode) -> Result<Value, Error> {
    match (op, value) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (_, Value::Number(x)) => real(op, x, trig_mode).map(Value::Number),
        (_, Value::Complex(z)) => complex(op, z, trig_mode),
        (UnaryOp::Abs, Value::Vector(v)) => Ok(Value::Number(v.iter().map(|x| x * x).sum::<f64>().sqrt())),
        (_, Value::Vector(v)) => v.into_iter()
            .map(|x| real(op, x, trig_mode))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Vector),
        (UnaryOp::Transpose, Value::Matrix { rows, cols, data }) => {
            let transposed = (0..cols)
                .flat_map(|c| (0..rows).map(move |r| (r, c)))
                .map(|(r, c)| data[r * cols + c])
                .collect();
            Ok(Value::Matrix { rows: cols, cols: rows, data: transposed })
        },
        (UnaryOp::Det, Value::Matrix { rows, data, .. }) => Ok(Value::Number(determinant(rows, data))),
        (_, Value::Matrix { rows, cols, data }) => data.into_iter()
            .map(|x| real(op, x, trig_mode))
            .collect::<Result<Vec<_>, _>>()
            .map(|data| Value::Matrix { rows, cols, data }),
        (_, value) => Err(Error::spanless(InvalidUnaryOperation { op, operand: value.typename() })),
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use crate::consts::PI;
    use super::*;

    #[test]
    fn inverse_trig_output_mode() {
        let y = real(UnaryOp::Arcsin, 1.0, TrigMode::Degrees).unwrap();
        assert_float_absolute_eq!(y, 90.0);
        let y = real(UnaryOp::Arcsin, 1.0, TrigMode::Radians).unwrap();
        assert_float_absolute_eq!(y, PI / 2.0);
    }

    #[test]
    fn determinant_with_pivoting() {
        assert_float_absolute_eq!(determinant(2, vec![0.0, 1.0, 1.0, 0.0]), -1.0);
        assert_float_absolute_eq!(determinant(3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]), 0.0);
        assert_eq!(determinant(0, Vec::new()), 1.0);
    }

    #[test]
    fn factorials() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(6.0).unwrap(), 720.0);
        assert!(factorial(-1.0).is_err());
    }

    #[test]
    fn elementwise() {
        let value = apply(UnaryOp::Sqrt, Value::Vector(vec![4.0, 9.0]), TrigMode::Radians).unwrap();
        assert_eq!(value, Value::Vector(vec![2.0, 3.0]));
        assert!(apply(UnaryOp::Sqrt, Value::Vector(vec![-4.0]), TrigMode::Radians).is_err());
    }
}
