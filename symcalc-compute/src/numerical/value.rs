use num_complex::Complex64;
use std::fmt::{self, Display, Formatter};
use super::result_type::ResultType;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A real number.
    Number(f64),

    /// A complex number.
    Complex(Complex64),

    /// A boolean.
    Boolean(bool),

    /// A vector of real numbers.
    Vector(Vec<f64>),

    /// A matrix of real numbers, stored in row-major order.
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    },

    /// The result of an expression that produces nothing, such as a function definition or a
    /// condition where no branch applies.
    Unit,
}

impl Value {
    /// Returns the typename of this value.
    pub fn typename(&self) -> &'static str {
        self.result_type().typename()
    }

    /// Returns the type of this value, including its shape.
    pub fn result_type(&self) -> ResultType {
        match self {
            Value::Number(_) => ResultType::Number,
            Value::Complex(_) => ResultType::Complex,
            Value::Boolean(_) => ResultType::Boolean,
            Value::Vector(v) => ResultType::Vector(v.len()),
            Value::Matrix { rows, cols, .. } => ResultType::Matrix(*rows, *cols),
            Value::Unit => ResultType::Unit,
        }
    }

    /// Consumes the value and converts a complex number with no imaginary part to a real number.
    /// Other values are returned unchanged.
    pub fn coerce_number(self) -> Self {
        match self {
            Value::Complex(c) if c.im == 0.0 => Value::Number(c.re),
            value => value,
        }
    }

    /// Returns the value as a real number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Complex(c) if c.im == 0.0 => Some(c.re),
            _ => None,
        }
    }

    /// Returns the value as a complex number, if it is a number of either kind.
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Value::Number(n) => Some(Complex64::new(*n, 0.0)),
            Value::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true if the two values are equal, allowing numbers to differ by at most `tol`.
    pub fn approx_eq(&self, other: &Value, tol: f64) -> bool {
        let close = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
        };
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => (a - b).abs() <= tol,
            (Value::Number(_) | Value::Complex(_), Value::Number(_) | Value::Complex(_)) => {
                match (self.as_complex(), other.as_complex()) {
                    (Some(a), Some(b)) => (a - b).norm() <= tol,
                    _ => false,
                }
            },
            (Value::Vector(a), Value::Vector(b)) => close(a, b),
            (
                Value::Matrix { rows: r1, cols: c1, data: a },
                Value::Matrix { rows: r2, cols: c2, data: b },
            ) => r1 == r2 && c1 == c2 && close(a, b),
            (a, b) => a == b,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Self {
        Value::Complex(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Writes the elements separated by commas.
fn write_list(f: &mut Formatter<'_>, values: &[f64]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Complex(c) => {
                if c.re == 0.0 {
                    write!(f, "{}i", c.im)
                } else if c.im.is_sign_negative() {
                    write!(f, "{} - {}i", c.re, -c.im)
                } else {
                    write!(f, "{} + {}i", c.re, c.im)
                }
            },
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Vector(v) => {
                f.write_str("[")?;
                write_list(f, v)?;
                f.write_str("]")
            },
            Value::Matrix { cols, data, .. } => {
                f.write_str("[")?;
                for (i, row) in data.chunks((*cols).max(1)).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("[")?;
                    write_list(f, row)?;
                    f.write_str("]")?;
                }
                f.write_str("]")
            },
            Value::Unit => f.write_str("()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Complex(Complex64::new(1.0, -2.0)).to_string(), "1 - 2i");
        assert_eq!(Value::Vector(vec![1.0, 2.0]).to_string(), "[1, 2]");
        assert_eq!(
            Value::Matrix { rows: 2, cols: 2, data: vec![1.0, 2.0, 3.0, 4.0] }.to_string(),
            "[[1, 2], [3, 4]]",
        );
    }

    #[test]
    fn coercion() {
        assert_eq!(Value::Complex(Complex64::new(3.0, 0.0)).coerce_number(), Value::Number(3.0));
        assert_eq!(Value::Complex(Complex64::new(0.0, 1.0)).as_number(), None);
        assert!(Value::Number(1.0).approx_eq(&Value::Complex(Complex64::new(1.0, 1e-12)), 1e-9));
    }
}
