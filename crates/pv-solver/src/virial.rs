//! Truncated virial approximation.
//!
//! ```text
//! 1 + B/V = pV / (R T Σz)   ⇔   a V² - V - B = 0,   a = p / (R T Σz)
//! ```
//!
//! `B` is extensive (`Σz · B_molar`). Closed form, no iteration.

use pv_eos::{EosModel, total_moles};

/// Low-density volume estimate from a known second virial coefficient.
///
/// - `B > 0` (above the Boyle temperature) → NaN; the truncated series has no
///   meaningful vapor root there.
/// - Discriminant `1 + 4aB ≤ 0` → `-2B`, the volume at the approximate spinodal.
/// - Otherwise the larger root `(1 + √Δ)/(2a)`.
pub fn volume_virial_b(b: f64, p: f64, t: f64, z: &[f64], r: f64) -> f64 {
    if b > 0.0 {
        return f64::NAN;
    }
    let a = p / (r * t * total_moles(z));
    let delta = 1.0 + 4.0 * a * b;
    if delta <= 0.0 {
        return -2.0 * b;
    }
    (1.0 + delta.sqrt()) / (2.0 * a)
}

/// [`volume_virial_b`] with `B` and `R` taken from the model at temperature `t`.
pub fn volume_virial(model: &dyn EosModel, p: f64, t: f64, z: &[f64]) -> f64 {
    let b = model.second_virial_coefficient(t, z);
    volume_virial_b(b, p, t, z, model.gas_constant())
}

/// Pressure of the truncated virial equation: `ΣzRT/V · (1 + B/V)`.
pub fn pressure_virial_b(b: f64, v: f64, t: f64, z: &[f64], r: f64) -> f64 {
    total_moles(z) * r * t / v * (1.0 + b / v)
}

/// [`pressure_virial_b`] with `B` and `R` taken from the model.
pub fn pressure_virial(model: &dyn EosModel, v: f64, t: f64, z: &[f64]) -> f64 {
    let b = model.second_virial_coefficient(t, z);
    pressure_virial_b(b, v, t, z, model.gas_constant())
}
