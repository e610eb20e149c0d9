//! Semiring weight layer for weighted finite-state transducers.
//!
//! Every weight type used by the automaton algorithms implements the
//! [`Weight`] contract. Algorithms written once against that contract
//! (natural order, exponentiation, conversion, the law checker) then apply
//! to every conforming type, and composite weights (tuples of sub-weights)
//! share a single text codec.
//!
//! # Architecture
//!
//! - [`properties`] -- Algebraic property flags declared by a weight type
//! - [`weight`] -- The [`Weight`] contract, [`DivideType`] and [`power`]
//! - [`natural_less`] -- Strict natural order derived from `plus`
//! - [`convert`] -- Cross-type conversion and seeded random generation
//! - [`config`] -- Separator/parenthesis configuration for composite text
//! - [`composite`] -- Composite weight writer and nesting-aware reader
//! - [`tester`] -- Randomized semiring-law checker

pub mod composite;
pub mod config;
pub mod convert;
pub mod natural_less;
pub mod properties;
pub mod tester;
pub mod weight;

#[cfg(test)]
mod test_support;

pub use composite::{CompositeWeightReader, CompositeWeightWriter};
pub use config::CompositeConfig;
pub use convert::{RandomWeight, WeightConvert, WeightGenerator};
pub use natural_less::NaturalLess;
pub use properties::Properties;
pub use tester::{LawViolation, WeightTester};
pub use weight::{DELTA, DivideType, NUM_RANDOM_WEIGHTS, TextElement, Weight, power};

/// Error type for weight configuration and composite text parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightError {
    #[error("invalid weight separator {0:?}: expected exactly one character")]
    InvalidSeparator(String),
    #[error("invalid weight parentheses {0:?}: expected zero or two characters")]
    InvalidParentheses(String),
    #[error("conflicting composite configuration: {0}")]
    ConflictingConfig(String),
    #[error("open parenthesis {expected:?} missing, found {found:?}")]
    MissingOpenParen { expected: char, found: Option<char> },
    #[error("close parenthesis {expected:?} missing")]
    MissingCloseParen { expected: char },
    #[error("unmatched close parenthesis {0:?}")]
    UnmatchedCloseParen(char),
    #[error("empty element")]
    EmptyElement,
    #[error("excess character {0:?} after composite weight")]
    ExcessCharacter(char),
    #[error("cannot parse {text:?} as {expected}")]
    InvalidElement { text: String, expected: String },
    #[error("input stream is invalid after an earlier parse error")]
    InvalidStream,
    #[error("weight type is not idempotent: {0}")]
    NotIdempotent(String),
}
