// The semiring weight contract.
//
// A semiring is specified by two binary operations `plus` and `times` and two
// designated elements `zero` and `one`:
//
//   plus:  associative, commutative, and has `zero` as its identity.
//   times: associative, has identity `one`, distributes w.r.t. `plus`, and
//          has `zero` as an annihilator: times(zero, a) == times(a, zero) == zero.
//
// A left semiring distributes on the left; a right semiring is similarly
// defined. Every weight type must form at least a left or right semiring.

use std::fmt::{self, Debug};
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::WeightError;
use crate::config::CompositeConfig;
use crate::properties::Properties;

/// A representable float near .001, the default tolerance for inexact weights.
pub const DELTA: f32 = 1.0 / 1024.0;

/// Default number of distinct values drawn by random weight generators.
pub const NUM_RANDOM_WEIGHTS: usize = 5;

/// Direction of division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DivideType {
    /// Solve `times(a, b) == c` for `b`.
    Left,
    /// Solve `times(a, b) == c` for `a`.
    Right,
    /// Division in a commutative semiring: either side.
    Any,
}

/// A value that can appear as one element of composite weight text.
///
/// Leaf weights print and parse their canonical form and ignore the
/// configuration. Composite weights pass the configuration on to a nested
/// [`CompositeWeightWriter`](crate::CompositeWeightWriter) /
/// [`CompositeWeightReader`](crate::CompositeWeightReader).
pub trait TextElement: Sized {
    /// Print the textual form of `self`.
    fn write_text(&self, out: &mut dyn fmt::Write, config: &CompositeConfig) -> fmt::Result;

    /// Parse a complete textual form. `text` holds exactly one element.
    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError>;

    /// Convenience: render to an owned string.
    fn to_text(&self, config: &CompositeConfig) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out, config);
        out
    }
}

macro_rules! impl_text_element_for_int {
    ($($t:ty),*) => {
        $(
            impl TextElement for $t {
                fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
                    write!(out, "{self}")
                }

                fn parse_text(text: &str, _config: &CompositeConfig) -> Result<Self, WeightError> {
                    text.parse().map_err(|_| WeightError::InvalidElement {
                        text: text.to_string(),
                        expected: stringify!($t).to_string(),
                    })
                }
            }
        )*
    };
}

impl_text_element_for_int!(u16, u32, u64, usize, i16, i32, i64);

/// Raw text element. The string must not contain the separator, whitespace
/// or parenthesis characters of the configuration it is written with.
impl TextElement for String {
    fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
        out.write_str(self)
    }

    fn parse_text(text: &str, _config: &CompositeConfig) -> Result<Self, WeightError> {
        Ok(text.to_string())
    }
}

/// The contract every weight type implements.
///
/// Implementations must satisfy, for all members `a`, `b`, `c`:
///
/// - `plus` is associative and commutative with identity `zero()`.
/// - `times` is associative with identity `one()`.
/// - `times(zero, a) == times(a, zero) == zero`.
/// - `times` distributes over `plus` on the side(s) [`PROPERTIES`](Self::PROPERTIES) asserts.
///
/// Operations are pure functions over immutable values, so independent
/// values can be combined concurrently from any number of threads.
pub trait Weight: Clone + Debug + PartialEq + Eq + Hash + TextElement + 'static {
    /// The type of the corresponding reverse weight.
    ///
    /// Typically `Self` for a (both left and right) semiring.
    type ReverseWeight: Weight<ReverseWeight = Self>;

    /// The algebraic laws this type declares.
    const PROPERTIES: Properties;

    /// Name of the weight type, e.g. `"tropical"`.
    fn type_name() -> String;

    /// Identity of `plus`, annihilator of `times`.
    fn zero() -> Self;

    /// Identity of `times`.
    fn one() -> Self;

    /// A fixed non-member used to signal an error in numeric paths.
    fn no_weight() -> Self;

    fn plus(&self, rhs: &Self) -> Self;

    fn times(&self, rhs: &Self) -> Self;

    /// Whether `self` belongs to the carrier set.
    fn is_member(&self) -> bool;

    /// For `c = times(a, b)`:
    ///
    /// - `c.divide(a, Left)` is a member `b'` with `times(a, b') == c` (left semiring);
    /// - `c.divide(b, Right)` is a member `a'` with `times(a', b) == c` (right semiring);
    /// - `Any` solves either side in a commutative semiring.
    ///
    /// Returns [`no_weight`](Self::no_weight) when no solution exists.
    fn divide(&self, rhs: &Self, side: DivideType) -> Self;

    /// Maps to the reverse semiring. Must satisfy:
    ///
    /// - `reverse(reverse(a)) == a`
    /// - `reverse(plus(a, b)) == plus(reverse(a), reverse(b))`
    /// - `reverse(times(a, b)) == times(reverse(b), reverse(a))`
    fn reverse(&self) -> Self::ReverseWeight;

    /// Canonical representative of the `delta`-width class containing `self`.
    /// Identity for exact weights.
    fn quantize(&self, _delta: f32) -> Self {
        self.clone()
    }

    /// Equality within `delta`. Exact equality for exact weights.
    fn approx_eq(&self, other: &Self, _delta: f32) -> bool {
        self == other
    }

    fn properties() -> Properties {
        Self::PROPERTIES
    }

    /// Deterministic hash of the value.
    fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Iterated product: `power(w, 0) == one()` and
/// `power(w, n) == times(power(w, n - 1), w)`.
///
/// `n` counts path multiplicities and stays small, so plain accumulation is
/// used rather than repeated squaring.
pub fn power<W: Weight>(w: &W, n: usize) -> W {
    let mut result = W::one();
    for _ in 0..n {
        result = result.times(w);
    }
    result
}
