// Log semiring: (-log(e^-x + e^-y), +, +infinity, 0) over f32.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rand::Rng;
use wfst_weight::{
    CompositeConfig, DivideType, Properties, RandomWeight, TextElement, Weight, WeightConvert,
    WeightError,
};

use crate::float;
use crate::tropical::TropicalWeight;

/// Negative log probability. `plus` sums the underlying probabilities.
#[derive(Debug, Clone, Copy)]
pub struct LogWeight(f32);

impl LogWeight {
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.0
    }
}

/// `-log(e^-a + e^-b)`, computed in f64 for accuracy.
fn log_plus(a: f32, b: f32) -> f32 {
    if a == f32::INFINITY {
        return b;
    }
    if b == f32::INFINITY {
        return a;
    }
    let (lo, hi) = if a <= b { (a as f64, b as f64) } else { (b as f64, a as f64) };
    (lo - (lo - hi).exp().ln_1p()) as f32
}

impl PartialEq for LogWeight {
    fn eq(&self, other: &Self) -> bool {
        float::float_eq(self.0, other.0)
    }
}

impl Eq for LogWeight {}

impl Hash for LogWeight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        float::hash_float(self.0, state);
    }
}

impl TextElement for LogWeight {
    fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
        float::write_float(out, self.0)
    }

    fn parse_text(text: &str, _config: &CompositeConfig) -> Result<Self, WeightError> {
        float::parse_float(text, "log").map(Self)
    }
}

impl fmt::Display for LogWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        float::write_float(f, self.0)
    }
}

impl FromStr for LogWeight {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        float::parse_float(s.trim(), "log").map(Self)
    }
}

impl Weight for LogWeight {
    type ReverseWeight = Self;
    const PROPERTIES: Properties = Properties::SEMIRING.union(Properties::COMMUTATIVE);

    fn type_name() -> String {
        "log".to_string()
    }

    fn zero() -> Self {
        Self(f32::INFINITY)
    }

    fn one() -> Self {
        Self(0.0)
    }

    fn no_weight() -> Self {
        Self(f32::NAN)
    }

    fn plus(&self, rhs: &Self) -> Self {
        if !self.is_member() || !rhs.is_member() {
            return Self::no_weight();
        }
        Self(log_plus(self.0, rhs.0))
    }

    fn times(&self, rhs: &Self) -> Self {
        if !self.is_member() || !rhs.is_member() {
            Self::no_weight()
        } else if self.0 == f32::INFINITY || rhs.0 == f32::INFINITY {
            Self::zero()
        } else {
            Self(self.0 + rhs.0)
        }
    }

    fn is_member(&self) -> bool {
        !self.0.is_nan() && self.0 != f32::NEG_INFINITY
    }

    fn divide(&self, rhs: &Self, _side: DivideType) -> Self {
        if !self.is_member() || !rhs.is_member() {
            return Self::no_weight();
        }
        float::divide_by_subtraction(self.0, rhs.0, "log").map_or_else(Self::no_weight, Self)
    }

    fn reverse(&self) -> Self {
        *self
    }

    fn quantize(&self, delta: f32) -> Self {
        Self(float::quantize(self.0, delta))
    }

    fn approx_eq(&self, other: &Self, delta: f32) -> bool {
        float::float_eq(self.0, other.0) || float::approx_eq(self.0, other.0, delta)
    }
}

impl RandomWeight for LogWeight {
    fn random<R: Rng + ?Sized>(rng: &mut R, allow_zero: bool) -> Self {
        float::random_value(rng, allow_zero).map_or_else(Self::zero, Self)
    }
}

impl WeightConvert<TropicalWeight> for LogWeight {
    fn convert(&self) -> TropicalWeight {
        TropicalWeight::new(self.0)
    }
}
