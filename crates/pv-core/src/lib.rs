//! Shared building blocks for the phasevol volume solvers.
//!
//! Plain `f64` solves report failure through [`FAILED_VOLUME`] and the
//! zero-pressure limit through [`IDEAL_GAS_LIMIT`]; [`PvError`] is reserved
//! for inputs that cannot describe a state at all. The [`Scalar`] trait lets
//! the same model code run on `f64` and on dual numbers.

pub mod error;
pub mod numeric;
pub mod scalar;
pub mod units;

pub use error::{PvError, PvResult};
pub use numeric::*;
pub use scalar::{Dual64, Scalar};
pub use units::*;
