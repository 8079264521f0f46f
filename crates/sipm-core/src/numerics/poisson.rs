use super::stable_sum;
use super::tables::{CountWeights, lookup_tables};
use crate::common::TRUNCATION_ORDER;

/// Poisson pmf `mean^j e^-mean / j!` for `j` in `0..TRUNCATION_ORDER`.
///
/// Counts at or beyond the truncation order are dropped without
/// renormalization; see [`truncation_tail_mass`].
pub fn poisson_weights(mean: f64) -> CountWeights {
    let inverse_factorial = lookup_tables().inverse_factorial();
    let attenuation = (-mean).exp();

    let mut weights = [0.0; TRUNCATION_ORDER];
    let mut power = 1.0;
    for (count, weight) in weights.iter_mut().enumerate() {
        *weight = power * attenuation * inverse_factorial[count];
        power *= mean;
    }
    weights
}

/// Poisson mass the truncated weights do not represent.
pub fn truncation_tail_mass(mean: f64) -> f64 {
    (1.0 - stable_sum(&poisson_weights(mean))).max(0.0)
}
