//! Numeric safety helpers
//!
//! One consistent zero-handling policy for every percentage computed in the
//! crate: division by zero and non-finite results normalize to `0`, never
//! surfacing as `NaN` in output.

/// Divide, returning `0.0` when the divisor is zero or the quotient is not
/// finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

/// Round to two decimal places, the precision retention percentages are
/// reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_guards_zero_denominator() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_safe_div_never_returns_nan() {
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_div(2.0, f64::NAN), 0.0);
        assert_eq!(safe_div(f64::INFINITY, 2.0), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }
}
