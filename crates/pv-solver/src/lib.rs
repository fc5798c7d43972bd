//! Volume root-finding and phase selection for equation-of-state models.
//!
//! Given pressure, temperature and mole amounts, this crate finds the total
//! volume at which a model's pressure matches the target. The model is
//! borrowed read-only through [`pv_eos::EosModel`]; the answer is the
//! mechanically stable root on the requested phase branch or, when the phase
//! is not specified, the root with the lowest Gibbs energy.
//!
//! Failure to find a root is reported as a NaN volume, never as an `Err`.
//! `+∞` is the ideal-gas limit at zero pressure.

pub mod bracket;
pub mod chill;
pub mod compressibility;
pub mod dispatch;
pub mod error;
pub mod gibbs;
pub mod recovery;
pub mod virial;

pub use bracket::{BracketSample, volume_bracket_refine};
pub use chill::{ChillConfig, volume_chill};
pub use compressibility::{CompressibilityConfig, volume_compress, volume_compress_scalar};
pub use dispatch::{
    Candidate, CandidateReport, ExecutionMode, VolumeOptions, volume, volume_at,
    volume_candidates,
};
pub use error::{SolverError, SolverResult};
pub use gibbs::{Selection, gibbs_select};
pub use recovery::{implicit_volume_correction, volume_scalar};
pub use virial::{pressure_virial, pressure_virial_b, volume_virial, volume_virial_b};
