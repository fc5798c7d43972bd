//! Numeric-value interface for solver bodies.
//!
//! The volume solvers are written once against [`Scalar`] and run unchanged on
//! plain `f64` values and on first-order dual numbers ([`Dual64`]). Every
//! branch decision inside a solver compares [`Scalar::primal`] values, so the
//! control flow of a dual-number solve is identical to the plain solve of its
//! primal part.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub use num_dual::Dual64;

/// Arithmetic, transcendental and derivative-query operations used by the solvers.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Lift a plain value (no derivative information).
    fn from_f64(v: f64) -> Self;

    /// The plain numeric part.
    fn primal(self) -> f64;

    fn exp(self) -> Self;

    fn ln(self) -> Self;

    fn sqrt(self) -> Self;

    /// Whether this value carries non-zero derivative information.
    fn carries_derivatives(&self) -> bool;

    /// Failure sentinel.
    fn nan() -> Self {
        Self::from_f64(f64::NAN)
    }

    fn is_nan(self) -> bool {
        self.primal().is_nan()
    }

    fn is_finite(self) -> bool {
        self.primal().is_finite()
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn primal(self) -> f64 {
        self
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn carries_derivatives(&self) -> bool {
        false
    }
}

impl Scalar for Dual64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        Dual64::new(v, 0.0)
    }

    #[inline]
    fn primal(self) -> f64 {
        self.re
    }

    #[inline]
    fn exp(self) -> Self {
        let e = self.re.exp();
        Dual64::new(e, self.eps * e)
    }

    #[inline]
    fn ln(self) -> Self {
        Dual64::new(self.re.ln(), self.eps / self.re)
    }

    #[inline]
    fn sqrt(self) -> Self {
        let s = self.re.sqrt();
        Dual64::new(s, self.eps / (2.0 * s))
    }

    #[inline]
    fn carries_derivatives(&self) -> bool {
        self.eps != 0.0
    }
}

/// Strip derivative information from a slice.
pub fn primal_slice<S: Scalar>(values: &[S]) -> Vec<f64> {
    values.iter().map(|v| v.primal()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_plus_log<S: Scalar>(x: S) -> S {
        x * x * x + x.ln() + x.sqrt().exp()
    }

    #[test]
    fn same_body_serves_plain_and_dual() {
        let x = 1.7;
        let plain = cube_plus_log(x);
        let dual = cube_plus_log(Dual64::new(x, 1.0));

        assert_relative_eq!(plain, dual.primal(), max_relative = 1e-15);

        let expected = 3.0 * x * x + 1.0 / x + x.sqrt().exp() / (2.0 * x.sqrt());
        assert_relative_eq!(dual.eps, expected, max_relative = 1e-12);
    }

    #[test]
    fn derivative_query() {
        assert!(!2.0_f64.carries_derivatives());
        assert!(!Dual64::from_f64(2.0).carries_derivatives());
        assert!(Dual64::new(2.0, 1.0).carries_derivatives());
    }

    #[test]
    fn sentinel_propagates_through_arithmetic() {
        let bad = <Dual64 as Scalar>::nan();
        let out = (bad + Dual64::new(1.0, 1.0)) * Dual64::from_f64(3.0);
        assert!(out.is_nan());
        assert!(Scalar::ln(<f64 as Scalar>::nan()).is_nan());
    }

    #[test]
    fn primal_slice_drops_derivatives() {
        let duals = [Dual64::new(1.0, 1.0), Dual64::new(2.5, -3.0)];
        assert_eq!(primal_slice(&duals), vec![1.0, 2.5]);
    }
}
