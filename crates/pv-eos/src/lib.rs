//! pv-eos: equation-of-state model capabilities for phasevol.
//!
//! Provides:
//! - The `EosModel` trait: the read-only capability surface the volume
//!   solvers borrow (pressure, Helmholtz energy and derivatives, bounds,
//!   initial guesses, virial coefficient, fluid/solid sub-models)
//! - The `ScalarEos` trait for pressure evaluation on generic numeric values
//! - Phase tags
//! - Reference models: generic cubic EoS, ideal gas, log-compressible solid,
//!   and a fluid + solid composite
//!
//! # Architecture
//!
//! Parameter tables, mixing-rule libraries and parameter-file loading live
//! outside this workspace. The reference models here are small, analytic and
//! exist so that the solvers can be exercised and demonstrated end to end.
//!
//! # Example
//!
//! ```
//! use pv_eos::{CubicEos, CubicKind, EosModel, Phase};
//!
//! let propane = CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap();
//! let z = [1.0];
//! let (p, dpdv) = propane.pressure_and_slope(1e-3, 300.0, &z);
//! assert!(p > 0.0 && dpdv < 0.0);
//! let v_liq = propane.initial_volume_guess(1e6, 300.0, &z, Phase::Liquid);
//! assert!(v_liq > propane.lower_bound_volume(300.0, &z));
//! ```

pub mod composite;
pub mod cubic;
pub mod error;
pub mod ideal_gas;
pub mod model;
pub mod phase;
pub mod solid;

// Re-exports for ergonomics
pub use composite::FluidSolidModel;
pub use cubic::{CubicEos, CubicKind};
pub use error::{EosError, EosResult};
pub use ideal_gas::IdealGas;
pub use model::{EosModel, HelmholtzDerivatives, ScalarEos, same_model, total_moles};
pub use phase::Phase;
pub use solid::LogCompressibleSolid;
