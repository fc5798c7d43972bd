//! Integration tests for the phase dispatcher.

use approx::assert_relative_eq;
use proptest::prelude::*;
use pv_eos::{CubicEos, CubicKind, EosModel, FluidSolidModel, LogCompressibleSolid, Phase};
use pv_solver::{ExecutionMode, SolverError, VolumeOptions, volume, volume_candidates};

fn propane() -> CubicEos {
    CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap()
}

fn solid_propane(u0: f64) -> FluidSolidModel<CubicEos, LogCompressibleSolid> {
    let solid = LogCompressibleSolid::new(1, 3e-5, 2e9, u0).unwrap();
    FluidSolidModel::new(propane(), solid).unwrap()
}

fn opts(phase: Phase, execution: ExecutionMode) -> VolumeOptions {
    VolumeOptions {
        phase,
        execution,
        ..Default::default()
    }
}

fn seq(phase: Phase) -> VolumeOptions {
    opts(phase, ExecutionMode::Sequential)
}

#[test]
fn vapor_selected_below_saturation() {
    let eos = propane();
    let (p, t) = (5e5, 300.0);
    let report = volume_candidates(&eos, p, t, &[1.0], &seq(Phase::Unknown)).unwrap();
    let vap = report.candidates[0];
    let liq = report.candidates[1];
    assert!(vap.volume.is_finite() && liq.volume.is_finite());
    assert_eq!(report.selected_phase(), Some(Phase::Vapor));
    assert!(vap.gibbs <= liq.gibbs);

    let v = volume(&eos, p, t, &[1.0], &seq(Phase::Unknown)).unwrap();
    assert!(v > 1e-3, "expected vapor volume, got {v}");
    assert_eq!(v, report.selection.volume);
}

#[test]
fn liquid_selected_above_saturation() {
    let eos = propane();
    let v = volume(&eos, 5e6, 300.0, &[1.0], &seq(Phase::Unknown)).unwrap();
    assert!(v < 2e-4, "expected liquid volume, got {v}");
    let stable = volume(&eos, 5e6, 300.0, &[1.0], &seq(Phase::Stable)).unwrap();
    assert_eq!(stable, v);
}

#[test]
fn concurrent_and_sequential_agree() {
    let models: Vec<Box<dyn EosModel>> = vec![
        Box::new(propane()),
        Box::new(CubicEos::pure(CubicKind::SoaveRedlichKwong, 369.8, 4.248e6, 0.152).unwrap()),
        Box::new(solid_propane(-2e4)),
    ];
    for model in &models {
        for p in [1e4, 5e5, 2e6, 5e6, 5e7] {
            for t in [250.0, 300.0, 400.0] {
                for phase in [Phase::Unknown, Phase::Stable] {
                    let concurrent = opts(phase, ExecutionMode::Concurrent);
                    let sequential = opts(phase, ExecutionMode::Sequential);
                    let a = volume(model.as_ref(), p, t, &[1.0], &concurrent).unwrap();
                    let b = volume(model.as_ref(), p, t, &[1.0], &sequential).unwrap();
                    assert!(
                        a == b || (a.is_nan() && b.is_nan()),
                        "{} at p={p}, T={t}: {a} vs {b}",
                        model.name()
                    );
                }
            }
        }
    }
}

#[test]
fn zero_pressure_without_phase_is_infinite() {
    let eos = propane();
    let v = volume(&eos, 0.0, 300.0, &[1.0], &seq(Phase::Unknown)).unwrap();
    assert_eq!(v, f64::INFINITY);
}

#[test]
fn composition_mismatch_is_fatal() {
    let eos = propane();
    let result = volume(&eos, 1e5, 300.0, &[], &seq(Phase::Vapor));
    assert!(matches!(result, Err(SolverError::ComponentMismatch { found: 0, .. })));
    assert!(volume_candidates(&eos, 1e5, 300.0, &[1.0, 1.0], &seq(Phase::Unknown)).is_err());
}

#[test]
fn solid_request_on_fluid_only_model_uses_liquid_branch() {
    let eos = propane();
    let solid = volume(&eos, 5e6, 300.0, &[1.0], &seq(Phase::Solid)).unwrap();
    let liquid = volume(&eos, 5e6, 300.0, &[1.0], &seq(Phase::Liquid)).unwrap();
    assert!(solid.is_finite());
    assert_relative_eq!(solid, liquid, max_relative = 1e-12);
}

#[test]
fn solid_request_on_composite_uses_solid_model() {
    let model = solid_propane(-2e4);
    let v = volume(&model, 5e6, 300.0, &[1.0], &seq(Phase::Solid)).unwrap();
    assert_relative_eq!(v, 3e-5 * (-5e6_f64 / 2e9).exp(), max_relative = 1e-10);
}

#[test]
fn failed_fluid_guess_retries_on_solid() {
    let model = solid_propane(-2e4);
    let lb = model.fluid().lower_bound_volume(300.0, &[1.0]);
    let v0 = 3e-5;
    assert!(v0 < lb);

    let opts = seq(Phase::Unknown).with_initial_guess(v0);
    let v = volume(&model, 5e6, 300.0, &[1.0], &opts).unwrap();
    assert_relative_eq!(v, 3e-5 * (-5e6_f64 / 2e9).exp(), max_relative = 1e-10);

    // Same guess on a fluid-only model has nowhere to go.
    let fluid_only = volume(&propane(), 5e6, 300.0, &[1.0], &opts).unwrap();
    assert!(fluid_only.is_nan());
}

#[test]
fn cohesive_energy_decides_solid_selection() {
    let (p, t) = (5e6, 300.0);

    let bound = solid_propane(-1e6);
    let report = volume_candidates(&bound, p, t, &[1.0], &seq(Phase::Unknown)).unwrap();
    assert_eq!(report.selected_phase(), Some(Phase::Solid));

    let unbound = solid_propane(1e6);
    let report = volume_candidates(&unbound, p, t, &[1.0], &seq(Phase::Unknown)).unwrap();
    // The vapor guess may also land on the liquid root; either way it is dense.
    assert_ne!(report.selected_phase(), Some(Phase::Solid));
    assert!(report.selection.volume < 2e-4);
    assert!(report.candidates[2].volume.is_finite());
    assert!(report.candidates[2].gibbs > report.selection.gibbs);
}

#[test]
fn mixture_volume_is_extensive() {
    let eos = CubicEos::new(
        CubicKind::PengRobinson,
        &[190.6, 369.8],
        &[4.599e6, 4.248e6],
        &[0.012, 0.152],
    )
    .unwrap();
    let z = [0.7, 0.3];
    let doubled = [1.4, 0.6];
    let v1 = volume(&eos, 2e6, 300.0, &z, &seq(Phase::Unknown)).unwrap();
    let v2 = volume(&eos, 2e6, 300.0, &doubled, &seq(Phase::Unknown)).unwrap();
    assert!(v1.is_finite());
    assert_relative_eq!(v2, 2.0 * v1, max_relative = 1e-10);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn selected_roots_are_mechanically_stable(p in 1e4_f64..2e7, t in 220.0_f64..600.0) {
        let eos = propane();
        let v = volume(&eos, p, t, &[1.0], &seq(Phase::Unknown)).unwrap();
        prop_assume!(v.is_finite());
        let (p_v, dpdv) = eos.pressure_and_slope(v, t, &[1.0]);
        prop_assert!(dpdv <= 0.0);
        prop_assert!((p_v - p).abs() <= 1e-6 * p);
    }

    #[test]
    fn branch_requests_return_roots_or_nan(
        p in 1e4_f64..2e7,
        t in 220.0_f64..600.0,
        phase in prop::sample::select(vec![Phase::Liquid, Phase::Vapor, Phase::Solid]),
    ) {
        let eos = propane();
        let v = volume(&eos, p, t, &[1.0], &seq(phase)).unwrap();
        if v.is_finite() {
            prop_assert!(v > eos.lower_bound_volume(t, &[1.0]));
            let (p_v, dpdv) = eos.pressure_and_slope(v, t, &[1.0]);
            prop_assert!(dpdv <= 0.0);
            prop_assert!((p_v - p).abs() <= 1e-6 * p);
        } else {
            prop_assert!(v.is_nan());
        }
    }
}
