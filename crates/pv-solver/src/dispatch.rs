//! Phase dispatcher: the public volume entry point.
//!
//! Given `(p, T, z)` and a phase specification, decides which sub-model(s) to
//! solve against, from which starting volumes, and which root to return.
//!
//! ```text
//! initial guess      → one solve (fluid, then solid if distinct and fluid failed)
//! Liquid|Vapor|Solid → one guess, one solve
//! Unknown|Stable     → p == 0 ? +∞ : vapor/liquid/solid solves + Gibbs selection
//! ```

use crate::compressibility::{CompressibilityConfig, volume_compress};
use crate::error::{SolverError, SolverResult};
use crate::gibbs::{Selection, candidate_gibbs};
use pv_core::units::{Pressure, Temperature, Volume, k_of, m3, pa_of};
use pv_core::{FAILED_VOLUME, IDEAL_GAS_LIMIT};
use pv_eos::{EosModel, Phase, same_model};
use tracing::debug;

/// Environment variable that makes [`VolumeOptions::default`] sequential.
pub const SEQUENTIAL_ENV: &str = "PV_SEQUENTIAL";

/// How the candidate solves of an unconstrained phase request are run.
///
/// Both modes produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Candidate solves run on the rayon pool
    #[default]
    Concurrent,
    /// Candidate solves run in order on the calling thread
    Sequential,
}

impl ExecutionMode {
    /// `Sequential` when `PV_SEQUENTIAL` is set, `Concurrent` otherwise.
    pub fn from_env() -> Self {
        if std::env::var(SEQUENTIAL_ENV).is_ok() {
            Self::Sequential
        } else {
            Self::Concurrent
        }
    }
}

/// Options for a volume computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeOptions {
    /// Requested phase
    pub phase: Phase,
    /// Candidate execution mode
    pub execution: ExecutionMode,
    /// Caller-supplied starting volume [m³]
    pub initial_guess: Option<f64>,
    /// Root-solver settings
    pub compress: CompressibilityConfig,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            phase: Phase::Unknown,
            execution: ExecutionMode::from_env(),
            initial_guess: None,
            compress: CompressibilityConfig::default(),
        }
    }
}

impl VolumeOptions {
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_initial_guess(mut self, v0: f64) -> Self {
        self.initial_guess = Some(v0);
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    fn validate(&self) -> SolverResult<()> {
        if self.compress.max_iterations == 0 {
            return Err(SolverError::InvalidArg {
                what: "max_iterations must be at least 1".to_string(),
            });
        }
        if !(self.compress.rel_tol.is_finite() && self.compress.rel_tol > 0.0) {
            return Err(SolverError::InvalidArg {
                what: format!("rel_tol must be positive, got {}", self.compress.rel_tol),
            });
        }
        Ok(())
    }
}

/// One candidate root of an unconstrained phase request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Branch the starting volume was estimated for
    pub phase: Phase,
    /// Starting volume [m³], NaN when the branch does not exist
    pub guess: f64,
    /// Converged root [m³], NaN on failure
    pub volume: f64,
    /// Gibbs energy [J], `+∞` when the candidate is rejected
    pub gibbs: f64,
}

/// Full candidate list with the selection made from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    /// Candidates in evaluation order: vapor, liquid, solid
    pub candidates: Vec<Candidate>,
    pub selection: Selection,
}

impl CandidateReport {
    /// Phase of the selected candidate.
    pub fn selected_phase(&self) -> Option<Phase> {
        self.selection.index.map(|i| self.candidates[i].phase)
    }
}

fn validate_composition(model: &dyn EosModel, z: &[f64]) -> SolverResult<()> {
    if z.len() != model.num_components() {
        return Err(SolverError::ComponentMismatch {
            model: model.name().to_string(),
            expected: model.num_components(),
            found: z.len(),
        });
    }
    Ok(())
}

/// Sub-model a returned root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootSource {
    Fluid,
    Solid,
}

/// Compute the volume [m³] of `z` at pressure `p` [Pa] and temperature `t` [K].
///
/// Returns `Ok(NaN)` when no acceptable root exists and `Ok(+∞)` in the
/// ideal-gas limit. Only a composition that does not match the model (or
/// unusable solver settings) is an `Err`.
pub fn volume(
    model: &dyn EosModel,
    p: f64,
    t: f64,
    z: &[f64],
    options: &VolumeOptions,
) -> SolverResult<f64> {
    resolve_volume(model, p, t, z, options).map(|(v, _)| v)
}

/// [`volume`], also naming the sub-model whose equation the root satisfies.
pub(crate) fn resolve_volume(
    model: &dyn EosModel,
    p: f64,
    t: f64,
    z: &[f64],
    options: &VolumeOptions,
) -> SolverResult<(f64, RootSource)> {
    validate_composition(model, z)?;
    options.validate()?;

    let fluid = model.fluid_submodel();
    let solid = model.solid_submodel();
    let cfg = &options.compress;

    if let Some(v0) = options.initial_guess.filter(|v| !v.is_nan()) {
        if options.phase == Phase::Solid {
            return Ok((volume_compress(solid, p, t, z, v0, cfg), RootSource::Solid));
        }
        let v = volume_compress(fluid, p, t, z, v0, cfg);
        if v.is_nan() && !same_model(fluid, solid) {
            debug!(model = model.name(), v0, "fluid solve failed, retrying on solid");
            return Ok((volume_compress(solid, p, t, z, v0, cfg), RootSource::Solid));
        }
        return Ok((v, RootSource::Fluid));
    }

    match options.phase {
        Phase::Liquid | Phase::Vapor => {
            let v0 = fluid.initial_volume_guess(p, t, z, options.phase);
            Ok((volume_compress(fluid, p, t, z, v0, cfg), RootSource::Fluid))
        }
        Phase::Solid => {
            let mut v0 = solid.initial_volume_guess(p, t, z, Phase::Solid);
            if v0.is_nan() && same_model(fluid, solid) {
                v0 = fluid.initial_volume_guess(p, t, z, Phase::Liquid);
            }
            Ok((volume_compress(solid, p, t, z, v0, cfg), RootSource::Solid))
        }
        Phase::Unknown | Phase::Stable if p == 0.0 => Ok((IDEAL_GAS_LIMIT, RootSource::Fluid)),
        Phase::Unknown | Phase::Stable => {
            let report = evaluate_candidates(model, p, t, z, options);
            let v = report.selection.volume;
            let selected = report.selected_phase();
            debug!(
                model = model.name(),
                p,
                t,
                phase = ?selected,
                v,
                "selected candidate root"
            );
            let source = match selected {
                Some(Phase::Solid) => RootSource::Solid,
                _ => RootSource::Fluid,
            };
            if options.phase == Phase::Stable && !v.is_nan() && !model.is_stable(v, t, z) {
                debug!(model = model.name(), v, "selected root failed stability test");
                return Ok((FAILED_VOLUME, source));
            }
            Ok((v, source))
        }
    }
}

/// Solve every candidate branch and report all of them with the selection.
///
/// Ignores the requested phase and initial guess.
pub fn volume_candidates(
    model: &dyn EosModel,
    p: f64,
    t: f64,
    z: &[f64],
    options: &VolumeOptions,
) -> SolverResult<CandidateReport> {
    validate_composition(model, z)?;
    options.validate()?;
    Ok(evaluate_candidates(model, p, t, z, options))
}

/// [`volume`] over `uom` quantities.
pub fn volume_at(
    model: &dyn EosModel,
    p: Pressure,
    t: Temperature,
    z: &[f64],
    options: &VolumeOptions,
) -> SolverResult<Volume> {
    volume(model, pa_of(p), k_of(t), z, options).map(m3)
}

fn evaluate_candidates(
    model: &dyn EosModel,
    p: f64,
    t: f64,
    z: &[f64],
    options: &VolumeOptions,
) -> CandidateReport {
    let fluid = model.fluid_submodel();
    let solid = model.solid_submodel();
    let cfg = &options.compress;

    let guesses = [
        fluid.initial_volume_guess(p, t, z, Phase::Vapor),
        fluid.initial_volume_guess(p, t, z, Phase::Liquid),
        solid.initial_volume_guess(p, t, z, Phase::Solid),
    ];
    let solve = |sub: &dyn EosModel, v0: f64| {
        if v0.is_nan() {
            FAILED_VOLUME
        } else {
            volume_compress(sub, p, t, z, v0, cfg)
        }
    };

    let (v_vap, v_liq, v_sol) = match options.execution {
        ExecutionMode::Concurrent => {
            let (v_vap, (v_liq, v_sol)) = rayon::join(
                || solve(fluid, guesses[0]),
                || {
                    rayon::join(
                        || solve(fluid, guesses[1]),
                        || solve(solid, guesses[2]),
                    )
                },
            );
            (v_vap, v_liq, v_sol)
        }
        ExecutionMode::Sequential => (
            solve(fluid, guesses[0]),
            solve(fluid, guesses[1]),
            solve(solid, guesses[2]),
        ),
    };

    let entries: [(&dyn EosModel, Phase, f64); 3] = [
        (fluid, Phase::Vapor, v_vap),
        (fluid, Phase::Liquid, v_liq),
        (solid, Phase::Solid, v_sol),
    ];
    let candidates: Vec<Candidate> = entries
        .iter()
        .zip(guesses)
        .map(|(&(sub, phase, volume), guess)| Candidate {
            phase,
            guess,
            volume,
            gibbs: candidate_gibbs(sub, volume, p, t, z),
        })
        .collect();
    let volumes: Vec<f64> = candidates.iter().map(|c| c.volume).collect();
    let energies: Vec<f64> = candidates.iter().map(|c| c.gibbs).collect();
    let selection = Selection::from_energies(&volumes, &energies);

    CandidateReport {
        candidates,
        selection,
    }
}
