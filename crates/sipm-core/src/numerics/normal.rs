use crate::common::SQRT_TWO_PI;

/// Normal probability density at `x`.
///
/// `sigma` is not checked; a non-positive spread yields meaningless values.
#[inline]
pub fn normal_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    let u = (x - mean) / sigma;
    (-0.5 * u * u).exp() / (SQRT_TWO_PI * sigma)
}

/// Evaluate one density over a grid, writing `scale * pdf(x)` into `out`.
///
/// `out` must have the same length as `x`.
#[inline]
pub fn normal_pdf_into(x: &[f64], mean: f64, sigma: f64, scale: f64, out: &mut [f64]) {
    debug_assert_eq!(x.len(), out.len());
    let inverse_sigma = 1.0 / sigma;
    let amplitude = scale / (SQRT_TWO_PI * sigma);
    for (value, &point) in out.iter_mut().zip(x) {
        let u = (point - mean) * inverse_sigma;
        *value = amplitude * (-0.5 * u * u).exp();
    }
}
