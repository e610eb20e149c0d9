//! Concrete semiring weights built on the `wfst-weight` contract.
//!
//! - [`TropicalWeight`] -- (min, +) over `f32`; idempotent with the path property
//! - [`LogWeight`] -- (-log(e^-a + e^-b), +) over `f32`
//! - [`ProductWeight`] -- componentwise pair of two weights, printed and parsed
//!   with the composite weight codec

mod float;
pub mod log;
pub mod product;
pub mod tropical;

pub use log::LogWeight;
pub use product::ProductWeight;
pub use tropical::TropicalWeight;
