//! Float helpers and the volume sentinels.

use crate::PvError;

/// Floating point type used throughout system
pub type Real = f64;

/// "No physically valid root here."
pub const FAILED_VOLUME: Real = Real::NAN;

/// Volume reached in the zero-pressure ideal-gas limit.
pub const IDEAL_GAS_LIMIT: Real = Real::INFINITY;

/// `|value - reference| / |reference|`, or the absolute deviation when the reference is zero.
///
/// NaN in either argument yields NaN.
pub fn relative_deviation(value: Real, reference: Real) -> Real {
    let diff = (value - reference).abs();
    if reference == 0.0 {
        diff
    } else {
        diff / reference.abs()
    }
}

/// Whether `value` lies within `limit` of `reference` in the sense of
/// [`relative_deviation`]. NaN never qualifies.
pub fn within_relative(value: Real, reference: Real, limit: Real) -> bool {
    let deviation = relative_deviation(value, reference);
    !deviation.is_nan() && deviation <= limit
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PvError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PvError::NonFinite { what, value: v })
    }
}
