// Small exact weight types shared by the unit tests.

use std::fmt;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::WeightError;
use crate::config::CompositeConfig;
use crate::convert::RandomWeight;
use crate::properties::Properties;
use crate::weight::{DivideType, NUM_RANDOM_WEIGHTS, TextElement, Weight};

/// Natural numbers under (+, *). Not idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountWeight(pub u64);

impl TextElement for CountWeight {
    fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
        write!(out, "{}", self.0)
    }

    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
        u64::parse_text(text, config).map(Self)
    }
}

impl Weight for CountWeight {
    type ReverseWeight = Self;
    const PROPERTIES: Properties = Properties::SEMIRING.union(Properties::COMMUTATIVE);

    fn type_name() -> String {
        "count".to_string()
    }
    fn zero() -> Self {
        Self(0)
    }
    fn one() -> Self {
        Self(1)
    }
    fn no_weight() -> Self {
        Self(u64::MAX)
    }
    fn plus(&self, rhs: &Self) -> Self {
        Self(self.0 + rhs.0)
    }
    fn times(&self, rhs: &Self) -> Self {
        Self(self.0 * rhs.0)
    }
    fn is_member(&self) -> bool {
        self.0 != u64::MAX
    }
    fn divide(&self, rhs: &Self, _side: DivideType) -> Self {
        if rhs.0 == 0 || self.0 % rhs.0 != 0 {
            Self::no_weight()
        } else {
            Self(self.0 / rhs.0)
        }
    }
    fn reverse(&self) -> Self {
        *self
    }
}

impl RandomWeight for CountWeight {
    fn random<R: Rng + ?Sized>(rng: &mut R, allow_zero: bool) -> Self {
        let low = if allow_zero { 0 } else { 1 };
        Self(rng.gen_range(low..=NUM_RANDOM_WEIGHTS as u64))
    }
}

/// Natural numbers under (min, +), with `None` as infinity.
/// Idempotent with the path property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinPlusWeight(pub Option<u32>);

impl TextElement for MinPlusWeight {
    fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
        match self.0 {
            Some(v) => write!(out, "{v}"),
            None => out.write_str("Infinity"),
        }
    }

    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
        if text == "Infinity" {
            return Ok(Self(None));
        }
        u32::parse_text(text, config).map(|v| Self(Some(v)))
    }
}

impl Weight for MinPlusWeight {
    type ReverseWeight = Self;
    const PROPERTIES: Properties = Properties::SEMIRING
        .union(Properties::COMMUTATIVE)
        .union(Properties::IDEMPOTENT)
        .union(Properties::PATH);

    fn type_name() -> String {
        "min-plus".to_string()
    }
    fn zero() -> Self {
        Self(None)
    }
    fn one() -> Self {
        Self(Some(0))
    }
    fn no_weight() -> Self {
        Self(Some(u32::MAX))
    }
    fn plus(&self, rhs: &Self) -> Self {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Self(Some(a.min(b))),
            (Some(_), None) => *self,
            _ => *rhs,
        }
    }
    fn times(&self, rhs: &Self) -> Self {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Self(Some(a + b)),
            _ => Self(None),
        }
    }
    fn is_member(&self) -> bool {
        self.0 != Some(u32::MAX)
    }
    fn divide(&self, rhs: &Self, _side: DivideType) -> Self {
        match (self.0, rhs.0) {
            (_, None) => Self::no_weight(),
            (None, _) => Self(None),
            (Some(c), Some(a)) if c >= a => Self(Some(c - a)),
            _ => Self::no_weight(),
        }
    }
    fn reverse(&self) -> Self {
        *self
    }
}

impl RandomWeight for MinPlusWeight {
    fn random<R: Rng + ?Sized>(rng: &mut R, allow_zero: bool) -> Self {
        let n = rng.gen_range(0..=NUM_RANDOM_WEIGHTS as u32);
        if allow_zero && n == NUM_RANDOM_WEIGHTS as u32 {
            Self::zero()
        } else {
            Self(Some(n))
        }
    }
}

/// Boolean semiring (or, and). Has no random generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolWeight {
    False,
    True,
    NoWeight,
}

impl TextElement for BoolWeight {
    fn write_text(&self, out: &mut dyn fmt::Write, _config: &CompositeConfig) -> fmt::Result {
        out.write_str(match self {
            Self::False => "0",
            Self::True => "1",
            Self::NoWeight => "BadNumber",
        })
    }

    fn parse_text(text: &str, _config: &CompositeConfig) -> Result<Self, WeightError> {
        match text {
            "0" => Ok(Self::False),
            "1" => Ok(Self::True),
            "BadNumber" => Ok(Self::NoWeight),
            _ => Err(WeightError::InvalidElement {
                text: text.to_string(),
                expected: "boolean".to_string(),
            }),
        }
    }
}

impl Weight for BoolWeight {
    type ReverseWeight = Self;
    const PROPERTIES: Properties = Properties::SEMIRING
        .union(Properties::COMMUTATIVE)
        .union(Properties::IDEMPOTENT)
        .union(Properties::PATH);

    fn type_name() -> String {
        "boolean".to_string()
    }
    fn zero() -> Self {
        Self::False
    }
    fn one() -> Self {
        Self::True
    }
    fn no_weight() -> Self {
        Self::NoWeight
    }
    fn plus(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (Self::NoWeight, _) | (_, Self::NoWeight) => Self::NoWeight,
            (Self::True, _) | (_, Self::True) => Self::True,
            _ => Self::False,
        }
    }
    fn times(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (Self::NoWeight, _) | (_, Self::NoWeight) => Self::NoWeight,
            (Self::True, Self::True) => Self::True,
            _ => Self::False,
        }
    }
    fn is_member(&self) -> bool {
        *self != Self::NoWeight
    }
    fn divide(&self, rhs: &Self, _side: DivideType) -> Self {
        match rhs {
            Self::True => *self,
            _ => Self::NoWeight,
        }
    }
    fn reverse(&self) -> Self {
        *self
    }
}

impl RandomWeight for BoolWeight {}

/// Records the level and target of every event it sees.
#[derive(Clone, Default)]
struct EventLog(Arc<Mutex<Vec<(Level, String)>>>);

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        self.0.lock().unwrap().push((*meta.level(), meta.target().to_string()));
    }
}

/// Run `f` under a subscriber scoped to this thread and return what it
/// logged as `(level, target)` pairs.
pub fn captured_events<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    let log = EventLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = log.0.lock().unwrap().clone();
    (result, events)
}

/// Number of ERROR events on the `wfst::weight` target.
pub fn weight_errors(events: &[(Level, String)]) -> usize {
    events
        .iter()
        .filter(|(level, target)| *level == Level::ERROR && target == "wfst::weight")
        .count()
}
