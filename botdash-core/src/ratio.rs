//! Ratio: a quotient whose "divide by zero with a positive numerator" case is
//! an explicit variant instead of an IEEE infinity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a ratio such as profit factor or Calmar.
///
/// Serializes as `{"finite": 3.0}` or `"infinite"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    Infinite,
}

impl Ratio {
    /// `numerator / denominator`, with a zero denominator mapping to
    /// `Infinite` when the numerator is positive and `Finite(0.0)` otherwise.
    pub fn from_parts(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            if numerator > 0.0 {
                Ratio::Infinite
            } else {
                Ratio::Finite(0.0)
            }
        } else {
            Ratio::Finite(numerator / denominator)
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Ratio::Infinite)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Ratio::Infinite => f.pad("∞"),
            Ratio::Finite(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_rules() {
        assert_eq!(Ratio::from_parts(30.0, 0.0), Ratio::Infinite);
        assert_eq!(Ratio::from_parts(0.0, 0.0), Ratio::Finite(0.0));
        assert_eq!(Ratio::from_parts(-5.0, 0.0), Ratio::Finite(0.0));
    }

    #[test]
    fn plain_division() {
        assert_eq!(Ratio::from_parts(30.0, 10.0), Ratio::Finite(3.0));
        assert_eq!(Ratio::from_parts(0.0, 10.0), Ratio::Finite(0.0));
    }

    #[test]
    fn accessors() {
        assert!(Ratio::Infinite.is_infinite());
        assert!(!Ratio::Finite(2.0).is_infinite());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{:.2}", Ratio::Finite(3.14159)), "3.14");
        assert_eq!(format!("{}", Ratio::Infinite), "∞");
    }

    #[test]
    fn serde_shape() {
        assert_eq!(
            serde_json::to_string(&Ratio::Finite(3.0)).unwrap(),
            r#"{"finite":3.0}"#
        );
        assert_eq!(
            serde_json::to_string(&Ratio::Infinite).unwrap(),
            r#""infinite""#
        );
        let back: Ratio = serde_json::from_str(r#""infinite""#).unwrap();
        assert_eq!(back, Ratio::Infinite);
    }
}
