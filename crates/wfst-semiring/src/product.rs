// Product semiring: componentwise operations over a pair of weights.

use std::fmt;

use rand::Rng;
use wfst_weight::{
    CompositeConfig, CompositeWeightReader, CompositeWeightWriter, DivideType, NUM_RANDOM_WEIGHTS,
    Properties, RandomWeight, TextElement, Weight, WeightError,
};

/// Pair of weights combined componentwise.
///
/// Textual form is a two-element composite value, so nested products need
/// parentheses to be read back unambiguously unless only the last component
/// is itself composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductWeight<W1, W2> {
    value1: W1,
    value2: W2,
}

impl<W1: Weight, W2: Weight> ProductWeight<W1, W2> {
    pub fn new(value1: W1, value2: W2) -> Self {
        Self { value1, value2 }
    }

    #[inline]
    pub fn value1(&self) -> &W1 {
        &self.value1
    }

    #[inline]
    pub fn value2(&self) -> &W2 {
        &self.value2
    }

    pub fn into_parts(self) -> (W1, W2) {
        (self.value1, self.value2)
    }
}

impl<W1: Weight, W2: Weight> TextElement for ProductWeight<W1, W2> {
    fn write_text(&self, out: &mut dyn fmt::Write, config: &CompositeConfig) -> fmt::Result {
        let mut writer = CompositeWeightWriter::new(out, config);
        writer.write_begin()?;
        writer.write_element(&self.value1)?;
        writer.write_element(&self.value2)?;
        writer.write_end()
    }

    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
        let mut chars = text.chars();
        let mut reader = CompositeWeightReader::new(&mut chars, config);
        reader.read_begin()?;
        let (value1, _) = reader.read_element::<W1>(false)?;
        let (value2, _) = reader.read_element::<W2>(true)?;
        reader.read_end()?;
        Ok(Self { value1, value2 })
    }
}

impl<W1: Weight, W2: Weight> fmt::Display for ProductWeight<W1, W2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, &CompositeConfig::default())
    }
}

impl<W1: Weight, W2: Weight> Weight for ProductWeight<W1, W2> {
    type ReverseWeight = ProductWeight<W1::ReverseWeight, W2::ReverseWeight>;
    const PROPERTIES: Properties = W1::PROPERTIES.intersection(W2::PROPERTIES).intersection(
        Properties::SEMIRING
            .union(Properties::COMMUTATIVE)
            .union(Properties::IDEMPOTENT),
    );

    fn type_name() -> String {
        format!("{}_X_{}", W1::type_name(), W2::type_name())
    }

    fn zero() -> Self {
        Self::new(W1::zero(), W2::zero())
    }

    fn one() -> Self {
        Self::new(W1::one(), W2::one())
    }

    fn no_weight() -> Self {
        Self::new(W1::no_weight(), W2::no_weight())
    }

    fn plus(&self, rhs: &Self) -> Self {
        Self::new(self.value1.plus(&rhs.value1), self.value2.plus(&rhs.value2))
    }

    fn times(&self, rhs: &Self) -> Self {
        Self::new(self.value1.times(&rhs.value1), self.value2.times(&rhs.value2))
    }

    fn is_member(&self) -> bool {
        self.value1.is_member() && self.value2.is_member()
    }

    fn divide(&self, rhs: &Self, side: DivideType) -> Self {
        Self::new(
            self.value1.divide(&rhs.value1, side),
            self.value2.divide(&rhs.value2, side),
        )
    }

    fn reverse(&self) -> Self::ReverseWeight {
        ProductWeight::new(self.value1.reverse(), self.value2.reverse())
    }

    fn quantize(&self, delta: f32) -> Self {
        Self::new(self.value1.quantize(delta), self.value2.quantize(delta))
    }

    fn approx_eq(&self, other: &Self, delta: f32) -> bool {
        self.value1.approx_eq(&other.value1, delta) && self.value2.approx_eq(&other.value2, delta)
    }
}

impl<W1: RandomWeight, W2: RandomWeight> RandomWeight for ProductWeight<W1, W2> {
    /// Either the product zero or a pair of non-zero components, so that
    /// any non-zero sample is a valid divisor.
    fn random<R: Rng + ?Sized>(rng: &mut R, allow_zero: bool) -> Self {
        if allow_zero && rng.gen_ratio(1, NUM_RANDOM_WEIGHTS as u32 + 1) {
            return Self::zero();
        }
        Self::new(W1::random(rng, false), W2::random(rng, false))
    }
}
