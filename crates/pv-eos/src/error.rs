//! Equation-of-state model errors.

use pv_core::PvError;
use thiserror::Error;

/// Result type for model construction and validation.
pub type EosResult<T> = Result<T, EosError>;

/// Errors raised while building or validating a model.
///
/// Numerical infeasibility at evaluation time is not an error: evaluations
/// return NaN and the solvers treat it as a failed root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EosError {
    /// Non-physical parameter values (negative critical pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Composition length does not match the model's component count.
    #[error("Composition has {found} entries but model has {expected} components")]
    ComponentMismatch { expected: usize, found: usize },
}

impl From<EosError> for PvError {
    fn from(err: EosError) -> Self {
        match err {
            EosError::NonPhysical { what } => PvError::NonPhysical {
                what: what.to_string(),
            },
            EosError::InvalidArg { what } => PvError::InvalidArg {
                what: format!("Invalid model argument: {what}"),
            },
            EosError::ComponentMismatch { expected, found } => {
                PvError::ComponentMismatch { expected, found }
            }
        }
    }
}
