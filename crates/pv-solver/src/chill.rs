//! Thermal continuation ("chill") solver.
//!
//! Carries a known root `(v0, T0)` along the isobar to `T_target` with a
//! predictor built from the Helmholtz Hessian. Each step solves the
//! linearised system
//!
//! ```text
//! [ ∂p/∂V  ∂p/∂T ] [ΔV]   [p_target - p]
//! [   0      1   ] [ΔT] = [     ΔT     ]
//! ```
//!
//! Once the temperature is reached the same system reduces to an isothermal
//! Newton correction on V.

use nalgebra::{Matrix2, Vector2};
use pv_eos::EosModel;
use tracing::{debug, trace};

/// Thermal continuation configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChillConfig {
    /// Relative tolerance on temperature (and on the final volume correction)
    pub t_tol: f64,
    /// Maximum iterations
    pub max_iterations: usize,
    /// Consecutive non-positive volume predictions tolerated before failing
    pub max_invalid_steps: u32,
}

impl Default for ChillConfig {
    fn default() -> Self {
        Self {
            t_tol: 1e-8,
            max_iterations: 100,
            max_invalid_steps: 10,
        }
    }
}

/// Isobaric sensitivities at one state point.
#[derive(Debug, Clone, Copy)]
struct Sensitivities {
    p: f64,
    dp_dv: f64,
    dp_dt: f64,
}

impl Sensitivities {
    fn at(model: &dyn EosModel, v: f64, t: f64, z: &[f64]) -> Option<Self> {
        let d = model.helmholtz_derivatives(v, t, z);
        let s = Self {
            p: d.pressure(),
            dp_dv: d.dp_dv(),
            dp_dt: d.dp_dt(),
        };
        (s.p.is_finite() && s.dp_dv.is_finite() && s.dp_dt.is_finite()).then_some(s)
    }

    /// dT/dp at constant V; zero when the pressure does not depend on T.
    fn dt_dp(&self) -> f64 {
        if self.dp_dt == 0.0 { 0.0 } else { 1.0 / self.dp_dt }
    }
}

/// Temperature step toward `t_target`.
///
/// The predicted temperature is `T_target + dT/dp|_V · (p_target − p)`. A
/// prediction past `t_target` in the direction of travel is replaced by half
/// the remaining gap.
fn temperature_step(s: &Sensitivities, t: f64, t_target: f64, p_target: f64) -> f64 {
    let gap = t_target - t;
    let t_pred = t_target + s.dt_dp() * (p_target - s.p);
    let step = t_pred - t;
    if gap != 0.0 && step * gap.signum() > gap.abs() {
        0.5 * gap
    } else {
        step
    }
}

/// Follow a root from `(v0, t0)` to `t_target` at pressure `p_target`.
///
/// Returns NaN when the continuation cannot reach the target temperature.
pub fn volume_chill(
    model: &dyn EosModel,
    p_target: f64,
    t_target: f64,
    z: &[f64],
    v0: f64,
    t0: f64,
    config: &ChillConfig,
) -> f64 {
    if !v0.is_finite() || !t0.is_finite() {
        return f64::NAN;
    }

    let t_tol = config.t_tol * t_target.abs();
    let mut v = v0;
    let mut t = t0;
    let mut invalid = 0u32;

    for iter in 0..config.max_iterations {
        let Some(s) = Sensitivities::at(model, v, t, z) else {
            debug!(iter, v, t, "non-finite Helmholtz derivatives during continuation");
            return f64::NAN;
        };

        let at_target = (t_target - t).abs() <= t_tol;
        let dt = if at_target {
            t_target - t
        } else {
            temperature_step(&s, t, t_target, p_target)
        };

        let jacobian = Matrix2::new(s.dp_dv, s.dp_dt, 0.0, 1.0);
        let rhs = Vector2::new(p_target - s.p, dt);
        let Some(step) = jacobian.lu().solve(&rhs) else {
            debug!(iter, v, t, "singular continuation system");
            return f64::NAN;
        };

        let scale = 0.5_f64.powi(invalid as i32);
        let dv = scale * step[0];
        let v_new = v + dv;
        if !v_new.is_finite() {
            debug!(iter, v, t, "non-finite volume prediction");
            return f64::NAN;
        }
        if v_new <= 0.0 {
            invalid += 1;
            trace!(iter, v_new, invalid, "non-positive volume prediction");
            if invalid >= config.max_invalid_steps {
                debug!(iter, invalid, "too many invalid continuation steps");
                return f64::NAN;
            }
            continue;
        }

        invalid = 0;
        v = v_new;
        t += scale * step[1];
        trace!(iter, v, t, dv, "continuation step");

        if at_target && dv.abs() <= config.t_tol * v {
            return v;
        }
    }

    debug!(
        max_iterations = config.max_iterations,
        t, t_target, "continuation hit iteration cap"
    );
    f64::NAN
}
