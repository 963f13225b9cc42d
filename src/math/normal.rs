//! Standard normal distribution helpers.
//!
//! Only the CDF is needed (ADF p-values, coefficient p-values); forecast bands
//! use the fixed two-sided 95% quantile.

/// `Φ⁻¹(0.975)`: half-width multiplier of a two-sided 95% interval.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// Complementary error function, Abramowitz and Stegun 7.1.26.
///
/// Maximum absolute error 1.5e-7.
fn erfc_approx(x: f64) -> f64 {
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < 0.0 { 2.0 - erfc_abs } else { erfc_abs }
}

/// Standard normal CDF `Φ(x) = erfc(-x / √2) / 2`.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc_approx(-x / std::f64::consts::SQRT_2)
}

/// Two-sided p-value of a z statistic.
pub fn two_sided_p(z: f64) -> f64 {
    2.0 * (1.0 - norm_cdf(z.abs()))
}
