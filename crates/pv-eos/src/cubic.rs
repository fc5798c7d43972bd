//! Generic two-parameter cubic equations of state.
//!
//! ```text
//! p = ΣzRT/(V - B) - A/((V + δ1 B)(V + δ2 B))
//! A = Σ_i Σ_j z_i z_j (1 - k_ij) sqrt(a_i(T) a_j(T))
//! B = Σ_i z_i b_i
//! ```
//!
//! `A` and `B` are the extensive (mole-amount weighted) van der Waals one-fluid
//! parameters, so every expression below works directly in total volume.

use crate::error::{EosError, EosResult};
use crate::model::validation::{validate_finite, validate_positive};
use crate::model::{EosModel, HelmholtzDerivatives, ScalarEos, total_moles};
use crate::phase::Phase;
use pv_core::Scalar;
use pv_core::units::constants::R_GAS;

/// Cubic family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubicKind {
    VanDerWaals,
    SoaveRedlichKwong,
    PengRobinson,
}

impl CubicKind {
    fn omega_a(&self) -> f64 {
        match self {
            CubicKind::VanDerWaals => 27.0 / 64.0,
            CubicKind::SoaveRedlichKwong => 0.427_48,
            CubicKind::PengRobinson => 0.457_24,
        }
    }

    fn omega_b(&self) -> f64 {
        match self {
            CubicKind::VanDerWaals => 1.0 / 8.0,
            CubicKind::SoaveRedlichKwong => 0.086_64,
            CubicKind::PengRobinson => 0.077_80,
        }
    }

    /// (δ1, δ2) of the attractive denominator.
    fn deltas(&self) -> (f64, f64) {
        match self {
            CubicKind::VanDerWaals => (0.0, 0.0),
            CubicKind::SoaveRedlichKwong => (1.0, 0.0),
            CubicKind::PengRobinson => {
                let s2 = std::f64::consts::SQRT_2;
                (1.0 + s2, 1.0 - s2)
            }
        }
    }

    /// Slope κ(ω) of the Soave-type alpha function; zero for van der Waals.
    fn kappa(&self, omega: f64) -> f64 {
        match self {
            CubicKind::VanDerWaals => 0.0,
            CubicKind::SoaveRedlichKwong => 0.480 + 1.574 * omega - 0.176 * omega * omega,
            CubicKind::PengRobinson => 0.374_64 + 1.542_26 * omega - 0.269_92 * omega * omega,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CubicKind::VanDerWaals => "vdW",
            CubicKind::SoaveRedlichKwong => "SRK",
            CubicKind::PengRobinson => "PR",
        }
    }
}

impl std::str::FromStr for CubicKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VDW" | "VANDERWAALS" | "VAN DER WAALS" => Ok(CubicKind::VanDerWaals),
            "SRK" | "SOAVE" | "SOAVEREDLICHKWONG" => Ok(CubicKind::SoaveRedlichKwong),
            "PR" | "PENGROBINSON" | "PENG-ROBINSON" => Ok(CubicKind::PengRobinson),
            _ => Err("unknown cubic equation of state"),
        }
    }
}

/// Per-component parameters derived from critical constants.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CubicComponent {
    tc: f64,
    /// a(Tc) [Pa·m⁶/mol²]
    ac: f64,
    /// b [m³/mol]
    b: f64,
    kappa: f64,
}

/// A cubic equation of state for a mixture of `n` components.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicEos {
    kind: CubicKind,
    name: String,
    components: Vec<CubicComponent>,
    /// Binary interaction parameters, row-major n×n, symmetric, zero diagonal.
    kij: Vec<f64>,
}

impl CubicEos {
    /// Build from critical temperatures [K], critical pressures [Pa] and acentric factors.
    pub fn new(kind: CubicKind, tc: &[f64], pc: &[f64], omega: &[f64]) -> EosResult<Self> {
        if tc.is_empty() {
            return Err(EosError::InvalidArg {
                what: "empty component list",
            });
        }
        if tc.len() != pc.len() || tc.len() != omega.len() {
            return Err(EosError::InvalidArg {
                what: "critical constant arrays differ in length",
            });
        }

        let mut components = Vec::with_capacity(tc.len());
        for ((&tc_i, &pc_i), &omega_i) in tc.iter().zip(pc).zip(omega) {
            validate_positive(tc_i, "critical temperature")?;
            validate_positive(pc_i, "critical pressure")?;
            validate_finite(omega_i, "acentric factor")?;
            let rtc = R_GAS * tc_i;
            components.push(CubicComponent {
                tc: tc_i,
                ac: kind.omega_a() * rtc * rtc / pc_i,
                b: kind.omega_b() * rtc / pc_i,
                kappa: kind.kappa(omega_i),
            });
        }

        let n = components.len();
        Ok(Self {
            kind,
            name: format!("{}[{}]", kind.key(), n),
            components,
            kij: vec![0.0; n * n],
        })
    }

    /// Single-component convenience constructor.
    pub fn pure(kind: CubicKind, tc: f64, pc: f64, omega: f64) -> EosResult<Self> {
        Self::new(kind, &[tc], &[pc], &[omega])
    }

    /// Set a symmetric binary interaction parameter.
    pub fn with_kij(mut self, i: usize, j: usize, kij: f64) -> EosResult<Self> {
        let n = self.components.len();
        if i >= n || j >= n || i == j {
            return Err(EosError::InvalidArg {
                what: "binary interaction index",
            });
        }
        validate_finite(kij, "binary interaction parameter")?;
        self.kij[i * n + j] = kij;
        self.kij[j * n + i] = kij;
        Ok(self)
    }

    /// Extensive co-volume B = Σ z_i b_i [m³].
    pub fn covolume<S: Scalar>(&self, z: &[S]) -> S {
        self.components
            .iter()
            .zip(z)
            .fold(S::from_f64(0.0), |acc, (c, &zi)| acc + zi * S::from_f64(c.b))
    }

    /// a_i(T) = a_c,i · (1 + κ_i (1 - sqrt(T/Tc,i)))²
    fn component_a<S: Scalar>(c: &CubicComponent, t: S) -> S {
        let one = S::from_f64(1.0);
        let m = one + S::from_f64(c.kappa) * (one - (t / S::from_f64(c.tc)).sqrt());
        S::from_f64(c.ac) * m * m
    }

    /// da_i/dT
    fn component_da_dt(c: &CubicComponent, t: f64) -> f64 {
        let m = 1.0 + c.kappa * (1.0 - (t / c.tc).sqrt());
        -c.ac * c.kappa * m / (t * c.tc).sqrt()
    }

    /// Extensive attraction parameter A = ΣΣ z_i z_j (1 - k_ij) sqrt(a_i a_j).
    fn attraction<S: Scalar>(&self, t: S, z: &[S]) -> S {
        let n = self.components.len();
        let a: Vec<S> = self.components.iter().map(|c| Self::component_a(c, t)).collect();
        let mut sum = S::from_f64(0.0);
        for i in 0..n {
            for j in 0..n {
                let aij = (a[i] * a[j]).sqrt() * S::from_f64(1.0 - self.kij[i * n + j]);
                sum = sum + z[i] * z[j] * aij;
            }
        }
        sum
    }

    /// ∂A/∂T at fixed composition.
    fn attraction_dt(&self, t: f64, z: &[f64]) -> f64 {
        let n = self.components.len();
        let a: Vec<f64> = self.components.iter().map(|c| Self::component_a(c, t)).collect();
        let da: Vec<f64> = self
            .components
            .iter()
            .map(|c| Self::component_da_dt(c, t))
            .collect();
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let root = (a[i] * a[j]).sqrt();
                if root == 0.0 {
                    continue;
                }
                let d_root = (da[i] * a[j] + a[i] * da[j]) / (2.0 * root);
                sum += z[i] * z[j] * (1.0 - self.kij[i * n + j]) * d_root;
            }
        }
        sum
    }

    fn pressure_slope_generic<S: Scalar>(&self, v: S, t: S, z: &[S]) -> (S, S) {
        let b = self.covolume(z);
        if v.primal() <= b.primal() {
            return (S::nan(), S::nan());
        }
        let a = self.attraction(t, z);
        let (d1, d2) = self.kind.deltas();
        let nrt = total_moles(z) * S::from_f64(R_GAS) * t;

        let vb = v - b;
        let q1 = v + S::from_f64(d1) * b;
        let q2 = v + S::from_f64(d2) * b;
        let denom = q1 * q2;

        let p = nrt / vb - a / denom;
        let dpdv = -nrt / (vb * vb) + a * (q1 + q2) / (denom * denom);
        (p, dpdv)
    }

    fn helmholtz_residual(&self, v: f64, t: f64, z: &[f64]) -> f64 {
        let b = self.covolume(z);
        let a = self.attraction(t, z);
        let nrt = total_moles(z) * R_GAS * t;
        let (d1, d2) = self.kind.deltas();

        let repulsive = -nrt * (1.0 - b / v).ln();
        let attractive = if d1 == d2 {
            -a / (v + d1 * b)
        } else {
            -a / (b * (d1 - d2)) * ((v + d1 * b) / (v + d2 * b)).ln()
        };
        repulsive + attractive
    }
}

/// A_ideal = RT Σ z_i (ln(z_i/V) - 1), dropping the volume-independent
/// thermal-wavelength terms.
pub(crate) fn helmholtz_ideal(v: f64, t: f64, z: &[f64]) -> f64 {
    let rt = R_GAS * t;
    z.iter()
        .filter(|&&zi| zi > 0.0)
        .map(|&zi| rt * zi * ((zi / v).ln() - 1.0))
        .sum()
}

impl EosModel for CubicEos {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_components(&self) -> usize {
        self.components.len()
    }

    fn pressure_and_slope(&self, v: f64, t: f64, z: &[f64]) -> (f64, f64) {
        self.pressure_slope_generic(v, t, z)
    }

    fn helmholtz_derivatives(&self, v: f64, t: f64, z: &[f64]) -> HelmholtzDerivatives {
        let (p, dpdv) = self.pressure_slope_generic(v, t, z);
        let b = self.covolume(z);
        let (d1, d2) = self.kind.deltas();
        let n_r = total_moles(z) * R_GAS;
        let dpdt = n_r / (v - b) - self.attraction_dt(t, z) / ((v + d1 * b) * (v + d2 * b));

        HelmholtzDerivatives {
            a: helmholtz_ideal(v, t, z) + self.helmholtz_residual(v, t, z),
            da_dv: -p,
            d2a_dv2: -dpdv,
            d2a_dvdt: -dpdt,
        }
    }

    fn lower_bound_volume(&self, _t: f64, z: &[f64]) -> f64 {
        self.covolume(z)
    }

    fn initial_volume_guess(&self, p: f64, t: f64, z: &[f64], phase: Phase) -> f64 {
        let lb = self.lower_bound_volume(t, z);
        match phase {
            Phase::Liquid => 1.25 * lb,
            Phase::Vapor | Phase::Unknown | Phase::Stable => {
                if p <= 0.0 {
                    return f64::INFINITY;
                }
                let v_ideal = total_moles(z) * R_GAS * t / p;
                let v_virial = v_ideal + self.second_virial_coefficient(t, z);
                if v_virial > 1.25 * lb { v_virial } else { v_ideal }
            }
            Phase::Solid => f64::NAN,
        }
    }

    fn second_virial_coefficient(&self, t: f64, z: &[f64]) -> f64 {
        let n = total_moles(z);
        self.covolume(z) - self.attraction(t, z) / (n * R_GAS * t)
    }

    fn fluid_submodel(&self) -> &dyn EosModel {
        self
    }

    fn solid_submodel(&self) -> &dyn EosModel {
        self
    }
}

impl ScalarEos for CubicEos {
    fn pressure_and_slope_scalar<S: Scalar>(&self, v: S, t: S, z: &[S]) -> (S, S) {
        self.pressure_slope_generic(v, t, z)
    }
}
