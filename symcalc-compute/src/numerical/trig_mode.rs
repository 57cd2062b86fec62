use crate::consts::PI;
use std::fmt;

#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// The angle unit of a context. Input to trigonometric functions is read in this unit, and
/// output from inverse trigonometric functions is written in it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
#[repr(u8)]
pub enum TrigMode {
    /// Use radians.
    #[default]
    Radians,

    /// Use degrees, where a full turn is 360.
    Degrees,

    /// Use gradians, where a full turn is 400.
    Gradians,
}

impl TrigMode {
    /// Returns the number of radians in one unit of this mode.
    fn scale(self) -> f64 {
        match self {
            TrigMode::Radians => 1.0,
            TrigMode::Degrees => PI / 180.0,
            TrigMode::Gradians => PI / 200.0,
        }
    }

    /// Converts an angle in this mode to radians.
    pub fn to_radians(self, angle: f64) -> f64 {
        angle * self.scale()
    }

    /// Converts an angle in radians to this mode.
    pub fn from_radians(self, angle: f64) -> f64 {
        angle / self.scale()
    }
}

impl fmt::Display for TrigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrigMode::Radians => write!(f, "radians"),
            TrigMode::Degrees => write!(f, "degrees"),
            TrigMode::Gradians => write!(f, "gradians"),
        }
    }
}

impl std::str::FromStr for TrigMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rad" | "radians" => Ok(TrigMode::Radians),
            "deg" | "degrees" => Ok(TrigMode::Degrees),
            "grad" | "gradians" => Ok(TrigMode::Gradians),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use super::*;

    #[test]
    fn conversions() {
        assert_float_absolute_eq!(TrigMode::Degrees.to_radians(180.0), PI);
        assert_float_absolute_eq!(TrigMode::Gradians.from_radians(PI / 2.0), 100.0);
        assert_eq!(TrigMode::Radians.to_radians(1.5), 1.5);
        assert_eq!("grad".parse::<TrigMode>(), Ok(TrigMode::Gradians));
    }
}
