//! Error types for solver operations.
//!
//! Only structural misuse is an error. A root that cannot be found is a
//! legitimate NaN volume, never an `Err`.

use pv_core::PvError;
use pv_eos::EosError;
use thiserror::Error;

/// Errors that can occur while setting up a volume computation.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Composition has {found} entries but model '{model}' has {expected} components")]
    ComponentMismatch {
        model: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Model error: {0}")]
    Eos(#[from] EosError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for PvError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ComponentMismatch {
                expected, found, ..
            } => PvError::ComponentMismatch { expected, found },
            SolverError::InvalidArg { what } => PvError::InvalidArg { what },
            SolverError::Eos(err) => err.into(),
        }
    }
}
