// Randomized checker for the semiring laws a weight type declares.

use crate::config::CompositeConfig;
use crate::convert::{RandomWeight, WeightGenerator};
use crate::natural_less::NaturalLess;
use crate::properties::Properties;
use crate::weight::{DELTA, DivideType, TextElement, Weight, power};

/// A semiring law that failed for a concrete sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{law} violated: {detail}")]
pub struct LawViolation {
    pub law: &'static str,
    pub detail: String,
}

fn check(holds: bool, law: &'static str, detail: impl FnOnce() -> String) -> Result<(), LawViolation> {
    if holds {
        Ok(())
    } else {
        Err(LawViolation {
            law,
            detail: detail(),
        })
    }
}

/// Draws weights from a [`WeightGenerator`] and checks them against the
/// semiring axioms, the declared [`Properties`], division, reversal,
/// quantization and textual round-trip.
///
/// Inexact types are compared with [`Weight::approx_eq`] at the configured
/// tolerance (default [`DELTA`]).
pub struct WeightTester<W> {
    generator: WeightGenerator<W>,
    config: CompositeConfig,
    delta: f32,
}

impl<W: RandomWeight> WeightTester<W> {
    pub fn new(generator: WeightGenerator<W>) -> Self {
        Self {
            generator,
            config: CompositeConfig::default(),
            delta: DELTA,
        }
    }

    /// Text configuration used for the round-trip check.
    pub fn with_config(mut self, config: CompositeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    /// Run `iterations` rounds, each on three fresh samples.
    pub fn test(&mut self, iterations: usize) -> Result<(), LawViolation> {
        self.test_identities()?;
        for _ in 0..iterations {
            let w1 = self.generator.generate();
            let w2 = self.generator.generate();
            let w3 = self.generator.generate();
            tracing::trace!(target: "wfst::weight", ?w1, ?w2, ?w3, "testing weights");
            self.test_semiring(&w1, &w2, &w3)?;
            self.test_natural_order(&w1, &w2)?;
            self.test_power(&w1)?;
            self.test_division(&w1, &w2)?;
            self.test_reverse(&w1, &w2)?;
            self.test_quantize(&w1)?;
            self.test_hash(&w1)?;
            self.test_text(&w1)?;
        }
        Ok(())
    }

    fn approx(&self, a: &W, b: &W) -> bool {
        a.approx_eq(b, self.delta)
    }

    fn test_identities(&self) -> Result<(), LawViolation> {
        check(W::zero().is_member(), "zero membership", || {
            format!("{:?} is not a member", W::zero())
        })?;
        check(W::one().is_member(), "one membership", || {
            format!("{:?} is not a member", W::one())
        })?;
        check(!W::no_weight().is_member(), "no_weight non-membership", || {
            format!("{:?} is a member", W::no_weight())
        })
    }

    fn test_semiring(&self, w1: &W, w2: &W, w3: &W) -> Result<(), LawViolation> {
        let props = W::properties();

        check(w1.is_member(), "sample membership", || format!("{w1:?}"))?;

        let lhs = w1.plus(&w2.plus(w3));
        let rhs = w1.plus(w2).plus(w3);
        check(self.approx(&lhs, &rhs), "plus associativity", || {
            format!("{w1:?}, {w2:?}, {w3:?}: {lhs:?} != {rhs:?}")
        })?;

        check(
            w1.plus(&W::zero()) == *w1 && W::zero().plus(w1) == *w1,
            "plus identity",
            || format!("{w1:?}"),
        )?;

        check(self.approx(&w1.plus(w2), &w2.plus(w1)), "plus commutativity", || {
            format!("{w1:?}, {w2:?}")
        })?;

        let lhs = w1.times(&w2.times(w3));
        let rhs = w1.times(w2).times(w3);
        check(self.approx(&lhs, &rhs), "times associativity", || {
            format!("{w1:?}, {w2:?}, {w3:?}: {lhs:?} != {rhs:?}")
        })?;

        if props.contains(Properties::LEFT_SEMIRING) {
            check(W::one().times(w1) == *w1, "left times identity", || format!("{w1:?}"))?;
            check(W::zero().times(w1) == W::zero(), "left zero annihilation", || {
                format!("{w1:?}")
            })?;
            let lhs = w1.times(&w2.plus(w3));
            let rhs = w1.times(w2).plus(&w1.times(w3));
            check(self.approx(&lhs, &rhs), "left distributivity", || {
                format!("{w1:?}, {w2:?}, {w3:?}: {lhs:?} != {rhs:?}")
            })?;
        }

        if props.contains(Properties::RIGHT_SEMIRING) {
            check(w1.times(&W::one()) == *w1, "right times identity", || format!("{w1:?}"))?;
            check(w1.times(&W::zero()) == W::zero(), "right zero annihilation", || {
                format!("{w1:?}")
            })?;
            let lhs = w1.plus(w2).times(w3);
            let rhs = w1.times(w3).plus(&w2.times(w3));
            check(self.approx(&lhs, &rhs), "right distributivity", || {
                format!("{w1:?}, {w2:?}, {w3:?}: {lhs:?} != {rhs:?}")
            })?;
        }

        if props.contains(Properties::IDEMPOTENT) {
            check(w1.plus(w1) == *w1, "idempotence", || format!("{w1:?}"))?;
        }

        if props.contains(Properties::PATH) {
            let sum = w1.plus(w2);
            check(sum == *w1 || sum == *w2, "path property", || {
                format!("{w1:?} + {w2:?} = {sum:?}")
            })?;
        }

        if props.contains(Properties::COMMUTATIVE) {
            check(self.approx(&w1.times(w2), &w2.times(w1)), "times commutativity", || {
                format!("{w1:?}, {w2:?}")
            })?;
        }

        Ok(())
    }

    fn test_natural_order(&self, w1: &W, w2: &W) -> Result<(), LawViolation> {
        if !W::properties().contains(Properties::IDEMPOTENT) {
            return Ok(());
        }
        let less = NaturalLess::<W>::new();
        let expected = w1.plus(w2) == *w1 && w1 != w2;
        check(less.less(w1, w2) == expected, "natural order", || {
            format!("{w1:?} < {w2:?} should be {expected}")
        })?;
        check(!less.less(w1, w1), "natural order irreflexivity", || format!("{w1:?}"))?;
        if less.is_total() && w1 != w2 {
            check(
                less.less(w1, w2) != less.less(w2, w1),
                "natural order totality",
                || format!("{w1:?}, {w2:?}"),
            )?;
        }
        Ok(())
    }

    fn test_power(&self, w: &W) -> Result<(), LawViolation> {
        check(power(w, 0) == W::one(), "power of zero", || format!("{w:?}"))?;
        check(self.approx(&power(w, 1), w), "power of one", || format!("{w:?}"))?;
        for n in [2, 3, 5] {
            let lhs = power(w, n);
            let rhs = power(w, n - 1).times(w);
            check(self.approx(&lhs, &rhs), "power recursion", || {
                format!("{w:?}^{n}: {lhs:?} != {rhs:?}")
            })?;
        }
        Ok(())
    }

    fn test_division(&self, w1: &W, w2: &W) -> Result<(), LawViolation> {
        let props = W::properties();
        let product = w1.times(w2);

        if props.contains(Properties::LEFT_SEMIRING) && *w1 != W::zero() {
            let d = product.divide(w1, DivideType::Left);
            check(d.is_member(), "left division membership", || {
                format!("({w1:?} * {w2:?}) / {w1:?} = {d:?}")
            })?;
            check(self.approx(&w1.times(&d), &product), "left division", || {
                format!("{w1:?} * {d:?} != {product:?}")
            })?;
        }

        if props.contains(Properties::RIGHT_SEMIRING) && *w2 != W::zero() {
            let d = product.divide(w2, DivideType::Right);
            check(d.is_member(), "right division membership", || {
                format!("({w1:?} * {w2:?}) / {w2:?} = {d:?}")
            })?;
            check(self.approx(&d.times(w2), &product), "right division", || {
                format!("{d:?} * {w2:?} != {product:?}")
            })?;
        }

        if props.contains(Properties::COMMUTATIVE) && *w1 != W::zero() {
            let d = product.divide(w1, DivideType::Any);
            check(d.is_member(), "division membership", || {
                format!("({w1:?} * {w2:?}) / {w1:?} = {d:?}")
            })?;
            check(self.approx(&d.times(w1), &product), "commutative division", || {
                format!("{d:?} * {w1:?} != {product:?}")
            })?;
        }

        Ok(())
    }

    fn test_reverse(&self, w1: &W, w2: &W) -> Result<(), LawViolation> {
        let r1 = w1.reverse();
        let r2 = w2.reverse();

        check(r1.reverse() == *w1, "reverse involution", || format!("{w1:?}"))?;

        let lhs = w1.plus(w2).reverse();
        let rhs = r1.plus(&r2);
        check(lhs.approx_eq(&rhs, self.delta), "reverse of plus", || {
            format!("{w1:?}, {w2:?}: {lhs:?} != {rhs:?}")
        })?;

        let lhs = w1.times(w2).reverse();
        let rhs = r2.times(&r1);
        check(lhs.approx_eq(&rhs, self.delta), "reverse of times", || {
            format!("{w1:?}, {w2:?}: {lhs:?} != {rhs:?}")
        })
    }

    fn test_quantize(&self, w: &W) -> Result<(), LawViolation> {
        let q = w.quantize(self.delta);
        check(q.quantize(self.delta) == q, "quantize idempotence", || {
            format!("{w:?} -> {q:?}")
        })?;
        check(self.approx(&q, w), "quantize tolerance", || format!("{w:?} -> {q:?}"))
    }

    fn test_hash(&self, w: &W) -> Result<(), LawViolation> {
        let copy = w.clone();
        check(copy.hash_value() == w.hash_value(), "hash consistency", || {
            format!("{w:?}")
        })
    }

    fn test_text(&self, w: &W) -> Result<(), LawViolation> {
        let text = w.to_text(&self.config);
        match W::parse_text(&text, &self.config) {
            Ok(parsed) => check(self.approx(&parsed, w), "text round-trip", || {
                format!("{w:?} -> {text:?} -> {parsed:?}")
            }),
            Err(err) => Err(LawViolation {
                law: "text round-trip",
                detail: format!("{w:?} -> {text:?}: {err}"),
            }),
        }
    }
}
