// Shared helpers for f32-valued weights: text form, quantization, hashing.

use std::fmt;
use std::hash::Hasher;

use rand::Rng;
use wfst_weight::{NUM_RANDOM_WEIGHTS, WeightError};

pub(crate) const POS_INFINITY_TEXT: &str = "Infinity";
pub(crate) const NEG_INFINITY_TEXT: &str = "-Infinity";
pub(crate) const BAD_NUMBER_TEXT: &str = "BadNumber";

pub(crate) fn write_float(out: &mut dyn fmt::Write, value: f32) -> fmt::Result {
    if value.is_nan() {
        out.write_str(BAD_NUMBER_TEXT)
    } else if value == f32::INFINITY {
        out.write_str(POS_INFINITY_TEXT)
    } else if value == f32::NEG_INFINITY {
        out.write_str(NEG_INFINITY_TEXT)
    } else {
        write!(out, "{value}")
    }
}

pub(crate) fn parse_float(text: &str, type_name: &str) -> Result<f32, WeightError> {
    match text {
        POS_INFINITY_TEXT => Ok(f32::INFINITY),
        NEG_INFINITY_TEXT => Ok(f32::NEG_INFINITY),
        BAD_NUMBER_TEXT => Ok(f32::NAN),
        _ => text.parse::<f32>().map_err(|_| WeightError::InvalidElement {
            text: text.to_string(),
            expected: type_name.to_string(),
        }),
    }
}

/// Snap `value` to the nearest multiple of `delta`. Non-finite values are kept.
pub(crate) fn quantize(value: f32, delta: f32) -> f32 {
    if !value.is_finite() {
        value
    } else {
        (value / delta + 0.5).floor() * delta
    }
}

pub(crate) fn approx_eq(a: f32, b: f32, delta: f32) -> bool {
    a <= b + delta && b <= a + delta
}

/// Equality treating every NaN as the same non-member.
pub(crate) fn float_eq(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Hash consistent with [`float_eq`]: `0.0` and `-0.0` hash alike, as do all NaNs.
pub(crate) fn hash_float<H: Hasher>(value: f32, state: &mut H) {
    let bits = if value.is_nan() {
        f32::NAN.to_bits()
    } else {
        (value + 0.0).to_bits()
    };
    state.write_u32(bits);
}

/// Integral value in `0..NUM_RANDOM_WEIGHTS`, or `None` (meaning zero) when allowed.
pub(crate) fn random_value<R: Rng + ?Sized>(rng: &mut R, allow_zero: bool) -> Option<f32> {
    let n = rng.gen_range(0..NUM_RANDOM_WEIGHTS + usize::from(allow_zero));
    if n == NUM_RANDOM_WEIGHTS {
        None
    } else {
        Some(n as f32)
    }
}

/// Shared divide for (x, +) semirings over the reals with +infinity as zero.
pub(crate) fn divide_by_subtraction(c: f32, a: f32, type_name: &str) -> Option<f32> {
    if a == f32::INFINITY {
        tracing::warn!(
            target: "wfst::weight",
            weight_type = type_name,
            "divide: division by zero has no solution"
        );
        None
    } else if c == f32::INFINITY {
        Some(f32::INFINITY)
    } else {
        Some(c - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: f32) -> String {
        let mut out = String::new();
        write_float(&mut out, value).unwrap();
        out
    }

    #[test]
    fn special_values_text() {
        assert_eq!(text(f32::INFINITY), "Infinity");
        assert_eq!(text(f32::NEG_INFINITY), "-Infinity");
        assert_eq!(text(f32::NAN), "BadNumber");
        assert_eq!(text(1.5), "1.5");
        assert_eq!(text(3.0), "3");
    }

    #[test]
    fn parse_special_values() {
        assert_eq!(parse_float("Infinity", "t").unwrap(), f32::INFINITY);
        assert_eq!(parse_float("-Infinity", "t").unwrap(), f32::NEG_INFINITY);
        assert!(parse_float("BadNumber", "t").unwrap().is_nan());
        assert_eq!(parse_float("-2.25", "t").unwrap(), -2.25);
        assert!(matches!(
            parse_float("two", "tropical"),
            Err(WeightError::InvalidElement { .. })
        ));
    }

    #[test]
    fn quantize_snaps_to_grid() {
        let delta = 1.0 / 1024.0;
        let q = quantize(0.1, delta);
        assert!((q - 0.1).abs() <= delta / 2.0);
        assert_eq!(quantize(q, delta), q);
        assert_eq!(quantize(f32::INFINITY, delta), f32::INFINITY);
        assert_eq!(quantize(2.0, delta), 2.0);
    }

    #[test]
    fn approx_eq_handles_infinity() {
        assert!(approx_eq(f32::INFINITY, f32::INFINITY, 0.001));
        assert!(!approx_eq(f32::INFINITY, 5.0, 0.001));
        assert!(approx_eq(1.0, 1.0005, 0.001));
        assert!(!approx_eq(1.0, 1.01, 0.001));
    }

    #[test]
    fn nan_equals_itself() {
        assert!(float_eq(f32::NAN, f32::NAN));
        assert!(float_eq(0.0, -0.0));
        assert!(!float_eq(f32::NAN, 1.0));
    }

    #[test]
    fn divide_by_infinity_has_no_solution() {
        assert_eq!(divide_by_subtraction(3.0, f32::INFINITY, "t"), None);
        assert_eq!(divide_by_subtraction(f32::INFINITY, 1.0, "t"), Some(f32::INFINITY));
        assert_eq!(divide_by_subtraction(3.0, 1.0, "t"), Some(2.0));
    }
}
