//! Derivative recovery for the plain volume root.
//!
//! The dispatcher runs on plain `f64`. For inputs that carry derivatives a
//! single implicit Newton correction at the converged root restores them:
//!
//! ```text
//! V = v − (p(v) − p_target) / (∂p/∂V)(v)
//! ```
//!
//! At a converged root the residual vanishes, so the primal is unchanged to
//! round-off while the derivative parts become `−(∂p/∂x − ∂p_target/∂x)/(∂p/∂V)`,
//! the implicit-function sensitivity of V.

use crate::dispatch::{RootSource, VolumeOptions, resolve_volume};
use crate::error::SolverResult;
use pv_core::Scalar;
use pv_core::scalar::primal_slice;
use pv_eos::ScalarEos;

/// Lift a plain root `v` into `S` with first-order sensitivities.
///
/// NaN and infinite roots are lifted unchanged.
pub fn implicit_volume_correction<S, F>(v: f64, p_target: S, pressure_fn: F) -> S
where
    S: Scalar,
    F: Fn(S) -> (S, S),
{
    let lifted = S::from_f64(v);
    if !v.is_finite() {
        return lifted;
    }
    let (p, dpdv) = pressure_fn(lifted);
    lifted - (p - p_target) / dpdv
}

/// Volume over generic numeric inputs.
///
/// Runs [`volume`](crate::volume) on the primal parts, then applies
/// [`implicit_volume_correction`] with the pressure of the sub-model that
/// produced the root.
pub fn volume_scalar<M, S>(
    model: &M,
    p: S,
    t: S,
    z: &[S],
    options: &VolumeOptions,
) -> SolverResult<S>
where
    M: ScalarEos,
    S: Scalar,
{
    let (v, source) = resolve_volume(model, p.primal(), t.primal(), &primal_slice(z), options)?;
    Ok(implicit_volume_correction(v, p, |vs| match source {
        RootSource::Fluid => model.pressure_and_slope_scalar(vs, t, z),
        RootSource::Solid => model.solid_pressure_and_slope_scalar(vs, t, z),
    }))
}
