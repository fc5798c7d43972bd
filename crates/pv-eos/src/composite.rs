//! A model with distinct fluid and solid sub-models.

use crate::error::{EosError, EosResult};
use crate::model::{EosModel, HelmholtzDerivatives, ScalarEos};
use crate::phase::Phase;
use pv_core::Scalar;

/// Pairs a fluid equation of state with a solid one over the same components.
///
/// The composite itself answers fluid queries; the dispatcher reaches the
/// solid through [`EosModel::solid_submodel`].
#[derive(Debug, Clone)]
pub struct FluidSolidModel<F, S> {
    fluid: F,
    solid: S,
    name: String,
}

impl<F: EosModel, S: EosModel> FluidSolidModel<F, S> {
    pub fn new(fluid: F, solid: S) -> EosResult<Self> {
        if fluid.num_components() != solid.num_components() {
            return Err(EosError::ComponentMismatch {
                expected: fluid.num_components(),
                found: solid.num_components(),
            });
        }
        let name = format!("{} + {}", fluid.name(), solid.name());
        Ok(Self { fluid, solid, name })
    }

    pub fn fluid(&self) -> &F {
        &self.fluid
    }

    pub fn solid(&self) -> &S {
        &self.solid
    }
}

impl<F: EosModel, S: EosModel> EosModel for FluidSolidModel<F, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_components(&self) -> usize {
        self.fluid.num_components()
    }

    fn pressure_and_slope(&self, v: f64, t: f64, z: &[f64]) -> (f64, f64) {
        self.fluid.pressure_and_slope(v, t, z)
    }

    fn helmholtz_derivatives(&self, v: f64, t: f64, z: &[f64]) -> HelmholtzDerivatives {
        self.fluid.helmholtz_derivatives(v, t, z)
    }

    fn lower_bound_volume(&self, t: f64, z: &[f64]) -> f64 {
        self.fluid.lower_bound_volume(t, z)
    }

    fn initial_volume_guess(&self, p: f64, t: f64, z: &[f64], phase: Phase) -> f64 {
        match phase {
            Phase::Solid => self.solid.initial_volume_guess(p, t, z, phase),
            _ => self.fluid.initial_volume_guess(p, t, z, phase),
        }
    }

    fn second_virial_coefficient(&self, t: f64, z: &[f64]) -> f64 {
        self.fluid.second_virial_coefficient(t, z)
    }

    fn gas_constant(&self) -> f64 {
        self.fluid.gas_constant()
    }

    fn fluid_submodel(&self) -> &dyn EosModel {
        &self.fluid
    }

    fn solid_submodel(&self) -> &dyn EosModel {
        &self.solid
    }

    fn is_stable(&self, v: f64, t: f64, z: &[f64]) -> bool {
        self.fluid.is_stable(v, t, z)
    }
}

impl<F: ScalarEos, S: ScalarEos> ScalarEos for FluidSolidModel<F, S> {
    fn pressure_and_slope_scalar<D: Scalar>(&self, v: D, t: D, z: &[D]) -> (D, D) {
        self.fluid.pressure_and_slope_scalar(v, t, z)
    }

    fn solid_pressure_and_slope_scalar<D: Scalar>(&self, v: D, t: D, z: &[D]) -> (D, D) {
        self.solid.pressure_and_slope_scalar(v, t, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CubicEos, CubicKind, IdealGas, LogCompressibleSolid};

    #[test]
    fn rejects_mismatched_components() {
        let gas = IdealGas::new(2).unwrap();
        let solid = LogCompressibleSolid::new(1, 2e-5, 5e9, -4e4).unwrap();
        assert_eq!(
            FluidSolidModel::new(gas, solid).unwrap_err(),
            EosError::ComponentMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn routes_guesses_by_phase() {
        let fluid = CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap();
        let solid = LogCompressibleSolid::new(1, 5e-5, 2e9, -3e4).unwrap();
        let model = FluidSolidModel::new(fluid, solid).unwrap();
        let z = [1.0];

        assert_eq!(model.initial_volume_guess(1e5, 200.0, &z, Phase::Solid), 5e-5);
        assert!(model.initial_volume_guess(1e5, 200.0, &z, Phase::Liquid).is_finite());
        assert!(model.name().contains("PR[1]"));
    }

    #[test]
    fn scalar_pressure_routes_by_submodel() {
        let fluid = CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap();
        let solid = LogCompressibleSolid::new(1, 3e-5, 2e9, -1e6).unwrap();
        let model = FluidSolidModel::new(fluid.clone(), solid.clone()).unwrap();
        let z = [1.0];

        // Below the cubic's covolume only the solid is defined
        let v = 2.9e-5;
        let (p_solid, dpdv_solid) = model.solid_pressure_and_slope_scalar(v, 300.0, &z);
        assert_eq!((p_solid, dpdv_solid), solid.pressure_and_slope(v, 300.0, &z));
        assert!(model.pressure_and_slope_scalar(v, 300.0, &z).0.is_nan());

        let v = 1e-3;
        assert_eq!(
            model.pressure_and_slope_scalar(v, 300.0, &z),
            fluid.pressure_and_slope(v, 300.0, &z)
        );
    }
}
