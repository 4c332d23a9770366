//! Normal distribution helpers for risk scoring.
//!
//! The erf approximation is compact (Abramowitz-Stegun 7.1.26, max absolute
//! error ~1.5e-7), which is plenty for risk scores quantized to integer
//! percent.

use std::f64::consts::SQRT_2;

/// Error function approximation.
///
/// Abramowitz-Stegun 7.1.26. Odd symmetry: erf(-x) = -erf(x).
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let ax = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * ax);
    let y = 1.0
        - (((((1.061_405_429 * t - 1.453_152_027) * t) + 1.421_413_741) * t - 0.284_496_736) * t
            + 0.254_829_592)
            * t
            * (-ax * ax).exp();
    sign * y
}

/// Standard normal CDF Φ(z).
pub fn std_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Normal CDF Φ(x; mean, sigma).
///
/// Returns NaN for non-positive or non-finite sigma.
pub fn normal_cdf(x: f64, mean: f64, sigma: f64) -> f64 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return f64::NAN;
    }
    std_normal_cdf((x - mean) / sigma)
}
