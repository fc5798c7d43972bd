//! Gibbs-energy selection among candidate roots.

use pv_core::{FAILED_VOLUME, relative_deviation, within_relative};
use pv_eos::EosModel;
use tracing::trace;

/// Relative pressure mismatch beyond which a candidate is not a root of the
/// requested state.
pub const PRESSURE_DEVIATION_LIMIT: f64 = 0.03;

/// Outcome of a Gibbs-energy selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Position of the winner in the candidate list, `None` if all were rejected
    pub index: Option<usize>,
    /// Selected volume [m³], NaN if all were rejected
    pub volume: f64,
    /// Gibbs energy of the winner [J], `+∞` if all were rejected
    pub gibbs: f64,
}

impl Selection {
    fn rejected() -> Self {
        Self {
            index: None,
            volume: FAILED_VOLUME,
            gibbs: f64::INFINITY,
        }
    }

    /// Select among volumes whose Gibbs energies are already known.
    ///
    /// `volumes` and `gibbs` are parallel; ties go to the earliest entry.
    pub fn from_energies(volumes: &[f64], gibbs: &[f64]) -> Self {
        let mut best = Self::rejected();
        for (i, (&v, &g)) in volumes.iter().zip(gibbs).enumerate() {
            if g < best.gibbs {
                best = Self {
                    index: Some(i),
                    volume: v,
                    gibbs: g,
                };
            }
        }
        best
    }
}

/// Gibbs energy `A + pV` of a candidate root, `+∞` when the candidate does
/// not qualify.
pub fn candidate_gibbs(model: &dyn EosModel, v: f64, p: f64, t: f64, z: &[f64]) -> f64 {
    if v.is_nan() {
        return f64::INFINITY;
    }
    let p_v = model.pressure(v, t, z);
    if !within_relative(p_v, p, PRESSURE_DEVIATION_LIMIT) {
        trace!(v, p_v, p, deviation = relative_deviation(p_v, p), "candidate pressure mismatch");
        return f64::INFINITY;
    }
    let g = model.helmholtz(v, t, z) + p * v;
    if g.is_nan() { f64::INFINITY } else { g }
}

/// Pick the candidate with the lowest Gibbs energy.
///
/// Each candidate is evaluated with the sub-model that produced it. Ties go
/// to the earliest candidate.
pub fn gibbs_select(
    candidates: &[(&dyn EosModel, f64)],
    p: f64,
    t: f64,
    z: &[f64],
) -> Selection {
    let volumes: Vec<f64> = candidates.iter().map(|&(_, v)| v).collect();
    let gibbs: Vec<f64> = candidates
        .iter()
        .map(|&(model, v)| candidate_gibbs(model, v, p, t, z))
        .collect();
    Selection::from_energies(&volumes, &gibbs)
}
