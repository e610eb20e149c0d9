// Cross-type weight conversion and seeded random weight generation.

use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::weight::Weight;

/// Conversion from `Self` into another weight type `To`.
///
/// The provided method is the unsupported case: it logs a diagnostic and
/// returns `To::no_weight()`. Converting a type to itself is the identity
/// (blanket impl). Every other supported pair lives with the concrete weight
/// types and overrides [`convert`](Self::convert); an empty impl opts a pair
/// into the unsupported default.
pub trait WeightConvert<To: Weight>: Weight {
    fn convert(&self) -> To {
        tracing::error!(
            target: "wfst::weight",
            from = %Self::type_name(),
            to = %To::type_name(),
            "WeightConvert: can't convert weight"
        );
        To::no_weight()
    }
}

impl<W: Weight> WeightConvert<W> for W {
    #[inline]
    fn convert(&self) -> W {
        self.clone()
    }
}

/// Convert `w` using the [`WeightConvert`] impl selected for the pair.
#[inline]
pub fn convert_weight<From, To>(w: &From) -> To
where
    From: WeightConvert<To>,
    To: Weight,
{
    w.convert()
}

/// Random sampling of carrier-set members, used to test semiring laws.
///
/// The provided method is the unsupported case: it logs a diagnostic and
/// returns `no_weight()`.
pub trait RandomWeight: Weight {
    /// Draw one weight. `zero()` may only be produced when `allow_zero`.
    fn random<R: Rng + ?Sized>(_rng: &mut R, _allow_zero: bool) -> Self {
        tracing::error!(
            target: "wfst::weight",
            weight_type = %Self::type_name(),
            "WeightGenerate: no random generator"
        );
        Self::no_weight()
    }
}

/// Reproducible stream of random weights.
///
/// Two generators built with the same seed yield the same sequence.
pub struct WeightGenerator<W> {
    rng: StdRng,
    allow_zero: bool,
    _weight: PhantomData<fn() -> W>,
}

impl<W: RandomWeight> WeightGenerator<W> {
    pub fn new(seed: u64, allow_zero: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            allow_zero,
            _weight: PhantomData,
        }
    }

    #[inline]
    pub fn allow_zero(&self) -> bool {
        self.allow_zero
    }

    pub fn generate(&mut self) -> W {
        W::random(&mut self.rng, self.allow_zero)
    }
}

impl<W: RandomWeight> Iterator for WeightGenerator<W> {
    type Item = W;

    fn next(&mut self) -> Option<W> {
        Some(self.generate())
    }
}
