//! Random sampling helpers shared by particle creation and retargeting.

use flurry_core::Range;
use rand::Rng;

/// Sample a value uniformly from `range`.
///
/// Integral ranges yield inclusive integers, anything else a real value in the
/// closed interval. Integral bounds outside `i64` take the real path.
/// Callers must pass a validated range.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, range: Range) -> f64 {
    if range.is_integral() && fits_i64(range) {
        rng.gen_range(range.min as i64..=range.max as i64) as f64
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

// i64::MAX as f64 rounds up to 2^63, which itself does not fit.
fn fits_i64(range: Range) -> bool {
    range.min >= i64::MIN as f64 && range.max < i64::MAX as f64
}

/// Linear interpolation from `start` toward `end` by `amount`.
pub fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    (1.0 - amount) * start + amount * end
}
