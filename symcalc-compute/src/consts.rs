//! Additional constants used in the library.

use num_complex::Complex64;
use once_cell::sync::Lazy;

pub use std::f64::consts::{E, FRAC_PI_2, PI, TAU};

/// The imaginary unit.
pub static I: Lazy<Complex64> = Lazy::new(|| Complex64::new(0.0, 1.0));

/// The golden ratio.
pub static PHI: Lazy<f64> = Lazy::new(|| (1.0 + 5f64.sqrt()) / 2.0);

/// Tolerance used when comparing floating-point results for approximate equality.
pub const EPSILON: f64 = 1e-9;
