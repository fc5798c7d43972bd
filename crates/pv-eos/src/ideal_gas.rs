//! Ideal gas: `p = ΣzRT/V`.

use crate::cubic::helmholtz_ideal;
use crate::error::{EosError, EosResult};
use crate::model::{EosModel, HelmholtzDerivatives, ScalarEos, total_moles};
use crate::phase::Phase;
use pv_core::Scalar;
use pv_core::units::constants::R_GAS;

#[derive(Debug, Clone, PartialEq)]
pub struct IdealGas {
    components: usize,
}

impl IdealGas {
    pub fn new(components: usize) -> EosResult<Self> {
        if components == 0 {
            return Err(EosError::InvalidArg {
                what: "ideal gas needs at least one component",
            });
        }
        Ok(Self { components })
    }
}

impl EosModel for IdealGas {
    fn name(&self) -> &str {
        "ideal gas"
    }

    fn num_components(&self) -> usize {
        self.components
    }

    fn pressure_and_slope(&self, v: f64, t: f64, z: &[f64]) -> (f64, f64) {
        self.pressure_and_slope_scalar(v, t, z)
    }

    fn helmholtz_derivatives(&self, v: f64, t: f64, z: &[f64]) -> HelmholtzDerivatives {
        let (p, dpdv) = self.pressure_and_slope(v, t, z);
        HelmholtzDerivatives {
            a: helmholtz_ideal(v, t, z),
            da_dv: -p,
            d2a_dv2: -dpdv,
            d2a_dvdt: -total_moles(z) * R_GAS / v,
        }
    }

    fn lower_bound_volume(&self, _t: f64, _z: &[f64]) -> f64 {
        0.0
    }

    fn initial_volume_guess(&self, p: f64, t: f64, z: &[f64], phase: Phase) -> f64 {
        match phase {
            Phase::Solid => f64::NAN,
            _ if p <= 0.0 => f64::INFINITY,
            _ => total_moles(z) * R_GAS * t / p,
        }
    }

    fn second_virial_coefficient(&self, _t: f64, _z: &[f64]) -> f64 {
        0.0
    }

    fn fluid_submodel(&self) -> &dyn EosModel {
        self
    }

    fn solid_submodel(&self) -> &dyn EosModel {
        self
    }
}

impl ScalarEos for IdealGas {
    fn pressure_and_slope_scalar<S: Scalar>(&self, v: S, t: S, z: &[S]) -> (S, S) {
        let nrt = total_moles(z) * S::from_f64(R_GAS) * t;
        (nrt / v, -nrt / (v * v))
    }
}
