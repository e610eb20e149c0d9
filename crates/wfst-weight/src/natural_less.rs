// Natural order of an idempotent semiring.
//
// By definition a <= b iff a + b = a. The natural order is a (negative)
// partial order iff the semiring is idempotent. It is monotonic for plus,
// left (resp. right) monotonic for times iff the semiring is left (resp.
// right) distributive, and total iff the semiring has the path property.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::WeightError;
use crate::properties::Properties;
use crate::weight::Weight;

/// Strict natural order: `a < b` iff `plus(a, b) == a` and `a != b`.
///
/// Only meaningful for weight types declaring [`Properties::IDEMPOTENT`].
/// Constructing one for any other type reports a diagnostic; its answers
/// must not be relied upon in that case.
#[derive(Debug, Clone, Copy)]
pub struct NaturalLess<W> {
    valid: bool,
    _weight: PhantomData<fn(&W)>,
}

impl<W: Weight> Default for NaturalLess<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Weight> NaturalLess<W> {
    /// Create the order, logging an error if `W` is not idempotent.
    pub fn new() -> Self {
        let valid = W::properties().contains(Properties::IDEMPOTENT);
        if !valid {
            tracing::error!(
                target: "wfst::weight",
                weight_type = %W::type_name(),
                "NaturalLess: weight type is not idempotent"
            );
        }
        Self {
            valid,
            _weight: PhantomData,
        }
    }

    /// Create the order, failing if `W` is not idempotent.
    pub fn try_new() -> Result<Self, WeightError> {
        if W::properties().contains(Properties::IDEMPOTENT) {
            Ok(Self {
                valid: true,
                _weight: PhantomData,
            })
        } else {
            Err(WeightError::NotIdempotent(W::type_name()))
        }
    }

    /// Whether `W` declares idempotence, i.e. the order is well defined.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the order is total (`W` declares the path property).
    #[inline]
    pub fn is_total(&self) -> bool {
        self.valid && W::properties().contains(Properties::PATH)
    }

    /// `a < b` under the natural order.
    pub fn less(&self, a: &W, b: &W) -> bool {
        a.plus(b) == *a && a != b
    }

    /// Compare two weights. `None` means the pair is incomparable, which
    /// only happens for types without the path property.
    pub fn partial_cmp(&self, a: &W, b: &W) -> Option<Ordering> {
        if a == b {
            Some(Ordering::Equal)
        } else if self.less(a, b) {
            Some(Ordering::Less)
        } else if self.less(b, a) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;
    use crate::config::CompositeConfig;
    use crate::test_support::{CountWeight, MinPlusWeight, captured_events, weight_errors};
    use crate::weight::{DivideType, TextElement};

    /// Subsets of {0..7} under (union, intersection): idempotent, no path property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Subset(u8);

    impl TextElement for Subset {
        fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
            write!(out, "{}", self.0)
        }

        fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
            u16::parse_text(text, config).map(|v| Self(v as u8))
        }
    }

    impl Weight for Subset {
        type ReverseWeight = Self;
        const PROPERTIES: Properties = Properties::SEMIRING
            .union(Properties::COMMUTATIVE)
            .union(Properties::IDEMPOTENT);

        fn type_name() -> String {
            "subset".to_string()
        }
        fn zero() -> Self {
            Self(0)
        }
        fn one() -> Self {
            Self(0xFF)
        }
        fn no_weight() -> Self {
            Self(0)
        }
        fn plus(&self, rhs: &Self) -> Self {
            Self(self.0 | rhs.0)
        }
        fn times(&self, rhs: &Self) -> Self {
            Self(self.0 & rhs.0)
        }
        fn is_member(&self) -> bool {
            true
        }
        fn divide(&self, _rhs: &Self, _side: DivideType) -> Self {
            Self::no_weight()
        }
        fn reverse(&self) -> Self {
            *self
        }
    }

    #[test]
    fn strict_order_follows_plus() {
        let less = NaturalLess::<Subset>::new();
        assert!(less.is_valid());
        // a < b iff a | b == a: supersets come first.
        assert!(less.less(&Subset(0b111), &Subset(0b011)));
        assert!(!less.less(&Subset(0b011), &Subset(0b111)));
        assert!(!less.less(&Subset(0b011), &Subset(0b011)));
    }

    #[test]
    fn partial_order_reports_incomparable_pairs() {
        let less = NaturalLess::<Subset>::new();
        assert!(!less.is_total());
        assert_eq!(less.partial_cmp(&Subset(0b01), &Subset(0b10)), None);
        assert_eq!(
            less.partial_cmp(&Subset(0b11), &Subset(0b10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            less.partial_cmp(&Subset(0b10), &Subset(0b11)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            less.partial_cmp(&Subset(0b10), &Subset(0b10)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn non_idempotent_type_is_flagged() {
        let less = NaturalLess::<CountWeight>::new();
        assert!(!less.is_valid());
        assert!(!less.is_total());
        assert_eq!(
            NaturalLess::<CountWeight>::try_new().unwrap_err(),
            WeightError::NotIdempotent("count".to_string())
        );
    }

    #[test]
    fn non_idempotent_type_logs_one_error() {
        let (less, events) = captured_events(NaturalLess::<CountWeight>::new);
        assert!(!less.is_valid());
        assert_eq!(weight_errors(&events), 1);

        let (_, events) = captured_events(NaturalLess::<CountWeight>::try_new);
        assert!(events.is_empty());
        let (_, events) = captured_events(NaturalLess::<MinPlusWeight>::new);
        assert!(events.is_empty());
    }

    #[test]
    fn path_property_gives_total_order() {
        let less = NaturalLess::<MinPlusWeight>::new();
        assert!(less.is_total());
        let a = MinPlusWeight(Some(2));
        let b = MinPlusWeight(Some(5));
        assert!(less.less(&a, &b));
        assert!(less.less(&b, &MinPlusWeight::zero()));
        assert_eq!(less.partial_cmp(&b, &a), Some(Ordering::Greater));
    }

    #[test]
    fn try_new_accepts_idempotent_type() {
        assert!(NaturalLess::<Subset>::try_new().unwrap().is_valid());
    }
}
