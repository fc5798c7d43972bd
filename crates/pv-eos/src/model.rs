//! Equation-of-state capability traits and validation helpers.

use crate::error::{EosError, EosResult};
use crate::phase::Phase;
use pv_core::Scalar;
use pv_core::units::constants::R_GAS;

/// Helmholtz free energy and the derivatives the volume solvers need.
///
/// All quantities are extensive in the total volume `V` [m³] and the mole
/// amounts `z` [mol]; `A` is in J.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmholtzDerivatives {
    /// A
    pub a: f64,
    /// ∂A/∂V = -p
    pub da_dv: f64,
    /// ∂²A/∂V² = -∂p/∂V
    pub d2a_dv2: f64,
    /// ∂²A/∂V∂T = -∂p/∂T
    pub d2a_dvdt: f64,
}

impl HelmholtzDerivatives {
    pub fn pressure(&self) -> f64 {
        -self.da_dv
    }

    pub fn dp_dv(&self) -> f64 {
        -self.d2a_dv2
    }

    pub fn dp_dt(&self) -> f64 {
        -self.d2a_dvdt
    }
}

/// Read-only capability surface of an equation-of-state model.
///
/// Implementations must be thread-safe (Send + Sync): the phase dispatcher
/// may evaluate several candidate roots concurrently against the same model.
/// Evaluations never fail loudly; a point outside the model's domain yields
/// NaN.
pub trait EosModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Number of components the composition vector must have.
    fn num_components(&self) -> usize;

    /// Pressure [Pa] and its isothermal volume slope ∂p/∂V [Pa/m³].
    fn pressure_and_slope(&self, v: f64, t: f64, z: &[f64]) -> (f64, f64);

    /// Pressure [Pa] alone.
    fn pressure(&self, v: f64, t: f64, z: &[f64]) -> f64 {
        self.pressure_and_slope(v, t, z).0
    }

    /// Helmholtz free energy A [J].
    fn helmholtz(&self, v: f64, t: f64, z: &[f64]) -> f64 {
        self.helmholtz_derivatives(v, t, z).a
    }

    /// Helmholtz free energy with first and second derivatives.
    fn helmholtz_derivatives(&self, v: f64, t: f64, z: &[f64]) -> HelmholtzDerivatives;

    /// Smallest admissible volume [m³]; iterates below it have diverged.
    fn lower_bound_volume(&self, t: f64, z: &[f64]) -> f64;

    /// Starting volume for a root search on the given phase branch.
    ///
    /// Returns NaN when the model has no such branch (e.g. a fluid model asked
    /// for a solid guess).
    fn initial_volume_guess(&self, p: f64, t: f64, z: &[f64], phase: Phase) -> f64;

    /// Second virial coefficient for the amounts `z`, extensive: `Σz · B_molar` [m³].
    fn second_virial_coefficient(&self, t: f64, z: &[f64]) -> f64;

    /// Molar gas constant [J/(mol·K)].
    fn gas_constant(&self) -> f64 {
        R_GAS
    }

    /// Sub-model describing fluid phases.
    fn fluid_submodel(&self) -> &dyn EosModel;

    /// Sub-model describing solid phases. Pure fluid models return themselves.
    fn solid_submodel(&self) -> &dyn EosModel;

    /// External phase-stability test applied to a selected root.
    ///
    /// Default accepts every root.
    fn is_stable(&self, _v: f64, _t: f64, _z: &[f64]) -> bool {
        true
    }
}

/// Pressure evaluation over generic numeric values.
///
/// Used by the derivative-carrying solver entry points; the plain `f64`
/// instantiation must agree with [`EosModel::pressure_and_slope`].
pub trait ScalarEos: EosModel {
    fn pressure_and_slope_scalar<S: Scalar>(&self, v: S, t: S, z: &[S]) -> (S, S);

    /// Scalar pressure of [`EosModel::solid_submodel`].
    ///
    /// Models that are their own solid sub-model keep the default.
    fn solid_pressure_and_slope_scalar<S: Scalar>(&self, v: S, t: S, z: &[S]) -> (S, S) {
        self.pressure_and_slope_scalar(v, t, z)
    }
}

/// Whether two sub-model references point at the same object.
pub fn same_model(a: &dyn EosModel, b: &dyn EosModel) -> bool {
    std::ptr::addr_eq(a as *const dyn EosModel, b as *const dyn EosModel)
}

/// Σz over any scalar type.
pub fn total_moles<S: Scalar>(z: &[S]) -> S {
    z.iter().fold(S::from_f64(0.0), |acc, &zi| acc + zi)
}

/// Validation helpers for model parameters and compositions.
pub mod validation {
    use super::*;

    /// Ensure a parameter is positive and finite.
    pub fn validate_positive(v: f64, what: &'static str) -> EosResult<()> {
        if !v.is_finite() || v <= 0.0 {
            return Err(EosError::NonPhysical { what });
        }
        Ok(())
    }

    /// Ensure a parameter is finite (may be negative).
    pub fn validate_finite(v: f64, what: &'static str) -> EosResult<()> {
        if !v.is_finite() {
            return Err(EosError::NonPhysical { what });
        }
        Ok(())
    }
}
