//! Compressibility fixed-point solver.
//!
//! Works in log-volume space:
//!
//! ```text
//! ln V_{i+1} = ln V_i + (p_target - p_i) / (V_i · ∂p/∂V_i)
//! ```
//!
//! Each step treats the isothermal compressibility as constant. Started from
//! the dense side of a liquid root the iterates rise monotonically toward it
//! and never cross into the mechanically unstable region.

use pv_core::Scalar;
use pv_core::scalar::primal_slice;
use pv_eos::{EosModel, ScalarEos};
use tracing::{debug, trace};

/// Compressibility solver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressibilityConfig {
    /// Maximum iterations before the solve is declared failed
    pub max_iterations: usize,
    /// Relative tolerance on ln V
    pub rel_tol: f64,
}

impl Default for CompressibilityConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            rel_tol: 1e-12,
        }
    }
}

/// Multiple of machine epsilon (scaled by the target pressure) under which the
/// pressure residual counts as an exact hit.
const EXACT_RESIDUAL_EPS: f64 = 4.0 * f64::EPSILON;

/// Solve `p(V) = p_target` from `v0` using the model's plain pressure relation.
///
/// Returns NaN when no mechanically stable root is reached from `v0`.
pub fn volume_compress(
    model: &dyn EosModel,
    p: f64,
    t: f64,
    z: &[f64],
    v0: f64,
    config: &CompressibilityConfig,
) -> f64 {
    let v_lb = model.lower_bound_volume(t, z);
    compress_iterate(|v| model.pressure_and_slope(v, t, z), p, v0, v_lb, config)
}

/// [`volume_compress`] over generic numeric values.
///
/// Derivative parts are iterated alongside the primal part and converge with it.
pub fn volume_compress_scalar<M: ScalarEos, S: Scalar>(
    model: &M,
    p: S,
    t: S,
    z: &[S],
    v0: S,
    config: &CompressibilityConfig,
) -> S {
    let v_lb = model.lower_bound_volume(t.primal(), &primal_slice(z));
    compress_iterate(
        |v| model.pressure_and_slope_scalar(v, t, z),
        p,
        v0,
        v_lb,
        config,
    )
}

/// The fixed-point iteration itself.
///
/// `pressure_fn` maps a volume to `(p, ∂p/∂V)`. All branch decisions compare
/// primal values, so plain and dual-number solves take identical paths.
pub fn compress_iterate<S, F>(
    pressure_fn: F,
    p_target: S,
    v0: S,
    v_lb: f64,
    config: &CompressibilityConfig,
) -> S
where
    S: Scalar,
    F: Fn(S) -> (S, S),
{
    if v0.is_nan() {
        return S::nan();
    }
    // Ideal-gas limit: zero pressure is met at infinite volume.
    if p_target.primal() == 0.0 && v0.primal() == f64::INFINITY {
        return v0;
    }

    let log_lb = v_lb.ln();
    let p_tol = EXACT_RESIDUAL_EPS * p_target.primal().abs();
    let mut log_v = v0.ln();

    for iter in 0..config.max_iterations {
        if log_v.primal() < log_lb {
            debug!(iter, v = log_v.primal().exp(), v_lb, "volume fell below lower bound");
            return S::nan();
        }

        let v = log_v.exp();
        let (p, dpdv) = pressure_fn(v);
        if !p.is_finite() || !dpdv.is_finite() {
            debug!(iter, v = v.primal(), "non-finite pressure evaluation");
            return S::nan();
        }
        if dpdv.primal() > 0.0 {
            debug!(iter, v = v.primal(), dpdv = dpdv.primal(), "mechanically unstable point");
            return S::nan();
        }

        let residual = p_target - p;
        if residual.primal().abs() < p_tol {
            return v;
        }

        let step = residual / (v * dpdv);
        log_v = log_v + step;
        trace!(iter, v = v.primal(), p = p.primal(), step = step.primal(), "compressibility step");

        if step.primal().abs() <= config.rel_tol * log_v.primal().abs().max(1.0) {
            return log_v.exp();
        }
    }

    debug!(
        max_iterations = config.max_iterations,
        p_target = p_target.primal(),
        "compressibility solve hit iteration cap"
    );
    S::nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pv_core::Dual64;
    use pv_core::units::constants::R_GAS;
    use pv_eos::{CubicEos, CubicKind, IdealGas, Phase};
    use std::cell::{Cell, RefCell};

    fn propane() -> CubicEos {
        CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap()
    }

    #[test]
    fn ideal_gas_converges_from_both_sides() {
        let gas = IdealGas::new(1).unwrap();
        let cfg = CompressibilityConfig::default();
        let exact = R_GAS * 300.0 / 2e5;
        for factor in [0.3, 0.9, 1.1, 4.0] {
            let v = volume_compress(&gas, 2e5, 300.0, &[1.0], factor * exact, &cfg);
            assert_relative_eq!(v, exact, max_relative = 1e-10);
        }
    }

    #[test]
    fn liquid_iterates_rise_monotonically() {
        let eos = propane();
        let z = [1.0];
        let (p, t) = (1e6, 300.0);
        let v0 = eos.initial_volume_guess(p, t, &z, Phase::Liquid);
        let iterates = RefCell::new(Vec::new());

        let root = compress_iterate(
            |v: f64| {
                iterates.borrow_mut().push(v);
                eos.pressure_and_slope(v, t, &z)
            },
            p,
            v0,
            eos.lower_bound_volume(t, &z),
            &CompressibilityConfig::default(),
        );

        assert!(root.is_finite());
        assert_relative_eq!(eos.pressure(root, t, &z), p, max_relative = 1e-8);
        let iterates = iterates.into_inner();
        assert!(iterates.len() > 2);
        for pair in iterates.windows(2) {
            assert!(pair[1] >= pair[0] * (1.0 - 1e-12), "{pair:?}");
        }
        assert!(iterates.iter().all(|&v| v <= root * (1.0 + 1e-10)));
    }

    #[test]
    fn starting_at_root_needs_at_most_one_step() {
        let eos = propane();
        let z = [1.0];
        let (p, t) = (5e5, 300.0);
        let cfg = CompressibilityConfig::default();
        let v0 = eos.initial_volume_guess(p, t, &z, Phase::Vapor);
        let root = volume_compress(&eos, p, t, &z, v0, &cfg);
        assert!(root.is_finite());

        let evaluations = Cell::new(0);
        let again = compress_iterate(
            |v: f64| {
                evaluations.set(evaluations.get() + 1);
                eos.pressure_and_slope(v, t, &z)
            },
            p,
            root,
            eos.lower_bound_volume(t, &z),
            &cfg,
        );
        assert!(evaluations.get() <= 2);
        assert_relative_eq!(again, root, max_relative = 1e-12);
    }

    #[test]
    fn sentinel_and_ideal_limit_short_circuit() {
        let gas = IdealGas::new(1).unwrap();
        let cfg = CompressibilityConfig::default();
        assert!(volume_compress(&gas, 1e5, 300.0, &[1.0], f64::NAN, &cfg).is_nan());
        assert_eq!(
            volume_compress(&gas, 0.0, 300.0, &[1.0], f64::INFINITY, &cfg),
            f64::INFINITY
        );
    }

    #[test]
    fn start_below_lower_bound_diverges() {
        let eos = propane();
        let z = [1.0];
        let lb = eos.lower_bound_volume(300.0, &z);
        let cfg = CompressibilityConfig::default();
        assert!(volume_compress(&eos, 1e6, 300.0, &z, 0.9 * lb, &cfg).is_nan());
    }

    #[test]
    fn unstable_start_fails() {
        // van der Waals below Tc: the isotherm rises between the spinodals.
        let eos = CubicEos::pure(CubicKind::VanDerWaals, 300.0, 5e6, 0.0).unwrap();
        let z = [1.0];
        let t = 250.0;
        let v_mid = 3.0 * eos.covolume(&z);
        let (_, dpdv) = eos.pressure_and_slope(v_mid, t, &z);
        assert!(dpdv > 0.0);
        let cfg = CompressibilityConfig::default();
        assert!(volume_compress(&eos, 3e6, t, &z, v_mid, &cfg).is_nan());
    }

    #[test]
    fn iteration_cap_yields_failure() {
        let gas = IdealGas::new(1).unwrap();
        let cfg = CompressibilityConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let exact = R_GAS * 300.0 / 2e5;
        assert!(volume_compress(&gas, 2e5, 300.0, &[1.0], 0.01 * exact, &cfg).is_nan());
    }

    #[test]
    fn dual_solve_matches_plain_and_carries_dv_dp() {
        let eos = propane();
        let (p, t) = (5e5, 300.0);
        let z = [1.0];
        let cfg = CompressibilityConfig::default();
        let v0 = eos.initial_volume_guess(p, t, &z, Phase::Vapor);
        let plain = volume_compress(&eos, p, t, &z, v0, &cfg);

        let dual = volume_compress_scalar(
            &eos,
            Dual64::new(p, 1.0),
            Dual64::from_f64(t),
            &[Dual64::from_f64(1.0)],
            Dual64::from_f64(v0),
            &cfg,
        );
        assert_relative_eq!(dual.re, plain, max_relative = 1e-12);
        let (_, dpdv) = eos.pressure_and_slope(plain, t, &z);
        assert_relative_eq!(dual.eps, 1.0 / dpdv, max_relative = 1e-6);
    }
}
