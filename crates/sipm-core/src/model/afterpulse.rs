use super::crosstalk::powers;
use crate::common::TRUNCATION_ORDER;
use crate::numerics::{CountWeights, stable_sum};

/// Fired-cell count probabilities split by afterpulse multiplicity.
///
/// With `q_n = (1 - pap)^n` the probability that none of `n` fired cells
/// afterpulses, the branches are `observed * q_n`,
/// `observed * (1 - q_n) * q_n` and `observed * (1 - q_n)^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AfterpulseSplit {
    pub no_afterpulse: CountWeights,
    pub single_afterpulse: CountWeights,
    /// Computed for completeness; the spectrum does not draw a peak for it.
    pub double_afterpulse: CountWeights,
}

impl AfterpulseSplit {
    pub fn split(observed: &CountWeights, pap: f64) -> Self {
        let quiet = powers(1.0 - pap);

        let mut no_afterpulse = [0.0; TRUNCATION_ORDER];
        let mut single_afterpulse = [0.0; TRUNCATION_ORDER];
        let mut double_afterpulse = [0.0; TRUNCATION_ORDER];
        for count in 0..TRUNCATION_ORDER {
            let q = quiet[count];
            let loud = 1.0 - q;
            no_afterpulse[count] = observed[count] * q;
            single_afterpulse[count] = observed[count] * loud * q;
            double_afterpulse[count] = observed[count] * loud * loud;
        }

        Self {
            no_afterpulse,
            single_afterpulse,
            double_afterpulse,
        }
    }

    /// Mass the spectrum keeps: the no-afterpulse and single-afterpulse
    /// branches summed over counts `1..`.
    pub fn drawn_mass(&self) -> f64 {
        stable_sum(&self.no_afterpulse[1..]) + stable_sum(&self.single_afterpulse[1..])
    }

    /// Mass of the double-afterpulse branch, which no peak represents.
    pub fn discarded_mass(&self) -> f64 {
        stable_sum(&self.double_afterpulse)
    }
}
