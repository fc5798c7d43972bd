//! Workspace-wide error type.
//!
//! Each crate keeps its own error enum and converts into [`PvError`] at the
//! boundary. A failed root is never an error; it is the NaN volume.

use thiserror::Error;

pub type PvResult<T> = Result<T, PvError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PvError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Composition has {found} entries, expected {expected}")]
    ComponentMismatch { expected: usize, found: usize },

    #[error("Non-physical parameter: {what}")]
    NonPhysical { what: String },
}
