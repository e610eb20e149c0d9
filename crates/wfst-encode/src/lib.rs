//! Reversible encoding of transducer labels and weights.
//!
//! Encoding folds the selected arc fields (output label, weight) into a
//! single integer label recorded in a codex, turning a transducer into an
//! acceptor and/or an unweighted automaton. Decoding with the same codex
//! restores the original arcs and final weights. The codex is persisted as
//! text using the composite weight codec of `wfst-weight`.
//!
//! # Architecture
//!
//! - [`fst`] -- Minimal mutable arc container ([`VectorFst`])
//! - [`table`] -- [`EncodeFlags`] and the codex ([`EncodeTable`]) with text read/write
//! - [`encode`] -- [`EncodeMapper`], [`encode()`]/[`decode()`] and path-level entry points

pub mod encode;
pub mod fst;
pub mod table;

pub use encode::{EncodeMapper, decode, decode_with_codex, encode, encode_with_codex};
pub use fst::{Arc, EPSILON, Label, StateId, VectorFst};
pub use table::{EncodeFlags, EncodeTable, EncodeTuple};

use wfst_weight::WeightError;

/// Error type for encoding, decoding and codex I/O.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("label {0} is not in the codex")]
    UnknownLabel(Label),
    #[error("encoded arc has different labels: {ilabel} != {olabel}")]
    LabelMismatch { ilabel: Label, olabel: Label },
    #[error("encoded arc with label {label} carries a non-trivial weight")]
    NonTrivialWeight { label: Label },
    #[error("codex weight type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("malformed codex at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error("codex I/O error: {0}")]
    Io(#[from] std::io::Error),
}
