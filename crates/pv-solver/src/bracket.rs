//! Bracket refinement by cubic Hermite interpolation of ln V over p.

/// One `(V, p, ∂p/∂V)` sample on an isotherm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketSample {
    pub v: f64,
    pub p: f64,
    pub dpdv: f64,
}

impl BracketSample {
    pub fn new(v: f64, p: f64, dpdv: f64) -> Self {
        Self { v, p, dpdv }
    }

    /// d(ln V)/dp = 1/(V ∂p/∂V), the local isothermal compressibility slope.
    fn log_volume_slope(&self) -> f64 {
        1.0 / (self.v * self.dpdv)
    }
}

/// Estimate the volume at pressure `p` between two samples.
///
/// Samples are ordered by pressure. Targets outside the bracket clamp to the
/// nearest end; a degenerate bracket (equal or non-finite pressures,
/// non-positive volumes) returns NaN.
pub fn volume_bracket_refine(s1: BracketSample, s2: BracketSample, p: f64) -> f64 {
    let (low, high) = if s1.p <= s2.p { (s1, s2) } else { (s2, s1) };

    let width = high.p - low.p;
    let usable = width > 0.0
        && width.is_finite()
        && low.v > 0.0
        && high.v > 0.0
        && low.dpdv.is_finite()
        && high.dpdv.is_finite();
    if !usable {
        return f64::NAN;
    }

    if p <= low.p {
        return low.v;
    }
    if p >= high.p {
        return high.v;
    }

    let s = (p - low.p) / width;
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    let log_v = h00 * low.v.ln()
        + h10 * width * low.log_volume_slope()
        + h01 * high.v.ln()
        + h11 * width * high.log_volume_slope();
    log_v.exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use pv_eos::{CubicEos, CubicKind, EosModel};

    fn sample(eos: &dyn EosModel, v: f64, t: f64) -> BracketSample {
        let (p, dpdv) = eos.pressure_and_slope(v, t, &[1.0]);
        BracketSample::new(v, p, dpdv)
    }

    #[test]
    fn ideal_gas_isotherm_is_tracked() {
        // ln V is linear in ln p, close to cubic in p over a narrow bracket
        let c = 2494.0;
        let s1 = BracketSample::new(c / 1e5, 1e5, -1e5 / (c / 1e5));
        let s2 = BracketSample::new(c / 1.1e5, 1.1e5, -1.1e5 / (c / 1.1e5));
        let v = volume_bracket_refine(s1, s2, 1.05e5);
        assert_relative_eq!(v, c / 1.05e5, max_relative = 1e-5);
    }

    #[test]
    fn refines_cubic_isotherm_between_samples() {
        let eos = CubicEos::pure(CubicKind::PengRobinson, 369.8, 4.248e6, 0.152).unwrap();
        let t = 400.0;
        let a = sample(&eos, 2.0e-3, t);
        let b = sample(&eos, 2.2e-3, t);
        let v_true = 2.1e-3;
        let p_mid = eos.pressure(v_true, t, &[1.0]);
        let v = volume_bracket_refine(b, a, p_mid);
        assert_relative_eq!(v, v_true, max_relative = 1e-4);
    }

    #[test]
    fn clamps_outside_bracket() {
        let lo = BracketSample::new(2.0, 1.0, -0.5);
        let hi = BracketSample::new(1.0, 2.0, -2.0);
        assert_eq!(volume_bracket_refine(hi, lo, 0.5), 2.0);
        assert_eq!(volume_bracket_refine(lo, hi, 3.0), 1.0);
    }

    #[test]
    fn degenerate_bracket_fails() {
        let a = BracketSample::new(1.0, 2.0, -1.0);
        assert!(volume_bracket_refine(a, a, 2.0).is_nan());
        let bad = BracketSample::new(1.0, f64::NAN, -1.0);
        assert!(volume_bracket_refine(a, bad, 2.0).is_nan());
        let negative = BracketSample::new(-1.0, 3.0, -1.0);
        assert!(volume_bracket_refine(a, negative, 2.5).is_nan());
    }

    proptest! {
        #[test]
        fn endpoints_return_sample_volumes(
            v_lo in 1e-5_f64..1.0,
            ratio in 0.1_f64..0.99,
            p_lo in 1.0_f64..1e7,
            dp in 1.0_f64..1e7,
        ) {
            let lo = BracketSample::new(v_lo, p_lo, -p_lo / v_lo);
            let hi = BracketSample::new(v_lo * ratio, p_lo + dp, -(p_lo + dp) / (v_lo * ratio));
            prop_assert_eq!(volume_bracket_refine(lo, hi, lo.p), lo.v);
            prop_assert_eq!(volume_bracket_refine(hi, lo, hi.p), hi.v);
        }
    }
}
