//! Log-compressible solid: `p = K ln(V_ref / V)`, `V_ref = Σz · v0`.
//!
//! The pressure is linear in `ln V`, so the compressibility solver lands on
//! the root in a single correction from `V_ref`.
//!
//! ```text
//! A(V) = Σz·u0 - K (V ln(V_ref/V) + V - V_ref)
//! ```
//!
//! `u0` is the cohesive energy per mole at the reference volume; it fixes the
//! solid's energy relative to whatever fluid model it is paired with.

use crate::error::EosResult;
use crate::model::validation::{validate_finite, validate_positive};
use crate::model::{EosModel, HelmholtzDerivatives, ScalarEos, total_moles};
use crate::phase::Phase;
use pv_core::Scalar;

#[derive(Debug, Clone, PartialEq)]
pub struct LogCompressibleSolid {
    components: usize,
    /// Reference molar volume at zero pressure [m³/mol]
    v0: f64,
    /// Bulk modulus [Pa]
    bulk_modulus: f64,
    /// Cohesive energy [J/mol]
    u0: f64,
}

impl LogCompressibleSolid {
    pub fn new(components: usize, v0: f64, bulk_modulus: f64, u0: f64) -> EosResult<Self> {
        validate_positive(components as f64, "component count")?;
        validate_positive(v0, "reference molar volume")?;
        validate_positive(bulk_modulus, "bulk modulus")?;
        validate_finite(u0, "cohesive energy")?;
        Ok(Self {
            components,
            v0,
            bulk_modulus,
            u0,
        })
    }

    fn reference_volume(&self, z: &[f64]) -> f64 {
        total_moles(z) * self.v0
    }
}

impl EosModel for LogCompressibleSolid {
    fn name(&self) -> &str {
        "log-compressible solid"
    }

    fn num_components(&self) -> usize {
        self.components
    }

    fn pressure_and_slope(&self, v: f64, _t: f64, z: &[f64]) -> (f64, f64) {
        let k = self.bulk_modulus;
        (k * (self.reference_volume(z) / v).ln(), -k / v)
    }

    fn helmholtz_derivatives(&self, v: f64, t: f64, z: &[f64]) -> HelmholtzDerivatives {
        let v_ref = self.reference_volume(z);
        let k = self.bulk_modulus;
        let (p, dpdv) = self.pressure_and_slope(v, t, z);
        HelmholtzDerivatives {
            a: total_moles(z) * self.u0 - k * (v * (v_ref / v).ln() + v - v_ref),
            da_dv: -p,
            d2a_dv2: -dpdv,
            d2a_dvdt: 0.0,
        }
    }

    fn lower_bound_volume(&self, _t: f64, z: &[f64]) -> f64 {
        0.5 * self.reference_volume(z)
    }

    fn initial_volume_guess(&self, _p: f64, _t: f64, z: &[f64], phase: Phase) -> f64 {
        match phase {
            Phase::Liquid | Phase::Vapor => f64::NAN,
            Phase::Solid | Phase::Unknown | Phase::Stable => self.reference_volume(z),
        }
    }

    fn second_virial_coefficient(&self, _t: f64, _z: &[f64]) -> f64 {
        f64::NAN
    }

    fn fluid_submodel(&self) -> &dyn EosModel {
        self
    }

    fn solid_submodel(&self) -> &dyn EosModel {
        self
    }
}

impl ScalarEos for LogCompressibleSolid {
    fn pressure_and_slope_scalar<S: Scalar>(&self, v: S, _t: S, z: &[S]) -> (S, S) {
        let k = S::from_f64(self.bulk_modulus);
        let v_ref = total_moles(z) * S::from_f64(self.v0);
        (k * (v_ref / v).ln(), -k / v)
    }
}
