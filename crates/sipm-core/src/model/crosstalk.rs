//! Optical crosstalk as a branching process.
//!
//! Each of `j` primary photo-electrons fires its own cell and may chain into
//! neighbouring cells. With per-step crosstalk probability `p`, the chance of
//! `j` primaries ending in exactly `n` fired cells is
//! `(1 - p)^j p^(n - j) C(n - 1, j - 1)`, the binomial counting the
//! compositions of `n` into `j` non-empty chains.

use crate::common::TRUNCATION_ORDER;
use crate::numerics::{CountWeights, lookup_tables};

/// Map true photo-electron count probabilities onto fired-cell counts.
///
/// Fired-cell counts at or beyond the truncation order are dropped, so the
/// output mass can be smaller than the input mass when `opct > 0`.
pub fn crosstalk_mixture(weights: &CountWeights, opct: f64) -> CountWeights {
    let binomial = lookup_tables().binomial();
    let survive = powers(1.0 - opct);
    let chain = powers(opct);

    let mut observed = [0.0; TRUNCATION_ORDER];
    for (fired, slot) in observed.iter_mut().enumerate() {
        *slot = (0..=fired)
            .map(|primaries| {
                weights[primaries]
                    * survive[primaries]
                    * chain[fired - primaries]
                    * binomial[fired][primaries]
            })
            .sum();
    }
    observed
}

/// `base^n` for `n` in `0..TRUNCATION_ORDER`, with `0^0 = 1`.
pub(crate) fn powers(base: f64) -> CountWeights {
    let mut table = [1.0; TRUNCATION_ORDER];
    for index in 1..TRUNCATION_ORDER {
        table[index] = table[index - 1] * base;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::{crosstalk_mixture, powers};
    use crate::common::TRUNCATION_ORDER;
    use crate::numerics::{poisson_weights, stable_sum};

    #[test]
    fn zero_crosstalk_is_identity() {
        let weights = poisson_weights(1.3);
        let observed = crosstalk_mixture(&weights, 0.0);
        assert_eq!(observed, weights);
    }

    #[test]
    fn single_primary_follows_geometric_chain() {
        let mut weights = [0.0; TRUNCATION_ORDER];
        weights[1] = 1.0;
        let opct: f64 = 0.3;
        let observed = crosstalk_mixture(&weights, opct);

        assert_eq!(observed[0], 0.0);
        for fired in 1..TRUNCATION_ORDER {
            let expected = (1.0 - opct) * opct.powi(fired as i32 - 1);
            assert!(
                (observed[fired] - expected).abs() <= 1.0e-15,
                "fired={fired}"
            );
        }
    }

    #[test]
    fn two_primaries_match_hand_enumeration() {
        let mut weights = [0.0; TRUNCATION_ORDER];
        weights[2] = 1.0;
        let p = 0.25;
        let observed = crosstalk_mixture(&weights, p);

        assert_eq!(observed[1], 0.0);
        assert!((observed[2] - 0.75 * 0.75).abs() <= 1.0e-15);
        // two orderings put the extra cell on either chain
        assert!((observed[3] - 2.0 * 0.75 * 0.75 * p).abs() <= 1.0e-15);
        assert!((observed[4] - 3.0 * 0.75 * 0.75 * p * p).abs() <= 1.0e-15);
    }

    #[test]
    fn zero_count_mass_is_untouched() {
        let weights = poisson_weights(0.8);
        let observed = crosstalk_mixture(&weights, 0.6);
        assert_eq!(observed[0], weights[0]);
    }

    #[test]
    fn crosstalk_shifts_mass_towards_higher_counts() {
        let weights = poisson_weights(1.0);
        let mut previous = crosstalk_mixture(&weights, 0.0);
        for step in 1..=8 {
            let opct = 0.1 * step as f64;
            let current = crosstalk_mixture(&weights, opct);
            let mut previous_cumulative = 0.0;
            let mut current_cumulative = 0.0;
            // within the truncated range, cumulative mass never grows with opct
            for fired in 0..TRUNCATION_ORDER {
                previous_cumulative += previous[fired];
                current_cumulative += current[fired];
                assert!(
                    current_cumulative <= previous_cumulative + 1.0e-12,
                    "opct={opct} fired={fired}"
                );
            }
            // past opct ~0.7 the truncated tail swallows enough mass to pull the mean back down
            if step <= 5 {
                assert!(mean_count(&current) > mean_count(&previous), "opct={opct}");
            }
            previous = current;
        }
    }

    #[test]
    fn mass_is_conserved_when_chains_stay_short() {
        let weights = poisson_weights(0.5);
        let observed = crosstalk_mixture(&weights, 0.05);
        let lost = stable_sum(&weights) - stable_sum(&observed);
        assert!((0.0..1.0e-8).contains(&lost), "lost={lost}");
    }

    fn mean_count(weights: &[f64]) -> f64 {
        weights
            .iter()
            .enumerate()
            .map(|(count, weight)| count as f64 * weight)
            .sum()
    }

    #[test]
    fn powers_start_at_one() {
        let table = powers(0.0);
        assert_eq!(table[0], 1.0);
        assert!(table[1..].iter().all(|value| *value == 0.0));
        assert_eq!(powers(2.0)[10], 1024.0);
    }
}
