//! Count-indexed lookup tables shared by every model evaluation.
//!
//! Built once on first access and never mutated afterwards, so concurrent
//! readers need no synchronization.

use crate::common::{FACTORIAL_TABLE_LEN, TRUNCATION_ORDER};
use std::sync::LazyLock;

pub type CountWeights = [f64; TRUNCATION_ORDER];
pub type CountMatrix = [[f64; TRUNCATION_ORDER]; TRUNCATION_ORDER];

static LOOKUP_TABLES: LazyLock<LookupTables> = LazyLock::new(LookupTables::build);

#[derive(Debug, Clone, PartialEq)]
pub struct LookupTables {
    factorial: [f64; FACTORIAL_TABLE_LEN],
    inverse_factorial: CountWeights,
    binomial: CountMatrix,
}

impl LookupTables {
    fn build() -> Self {
        let mut factorial = [1.0; FACTORIAL_TABLE_LEN];
        for index in 1..FACTORIAL_TABLE_LEN {
            factorial[index] = factorial[index - 1] * index as f64;
        }

        let mut inverse_factorial = [0.0; TRUNCATION_ORDER];
        for (index, value) in inverse_factorial.iter_mut().enumerate() {
            *value = 1.0 / factorial[index];
        }

        let mut binomial = [[0.0; TRUNCATION_ORDER]; TRUNCATION_ORDER];
        for (fired, row) in binomial.iter_mut().enumerate() {
            for (primaries, value) in row.iter_mut().enumerate() {
                *value = chain_binomial(fired, primaries);
            }
        }

        Self {
            factorial,
            inverse_factorial,
            binomial,
        }
    }

    pub fn factorial(&self) -> &[f64; FACTORIAL_TABLE_LEN] {
        &self.factorial
    }

    /// `1 / j!` for `j` in `0..TRUNCATION_ORDER`.
    pub fn inverse_factorial(&self) -> &CountWeights {
        &self.inverse_factorial
    }

    /// `binomial()[n][j] = C(n - 1, j - 1)`, zero outside its domain except
    /// for `n = j = 0`, which is one.
    pub fn binomial(&self) -> &CountMatrix {
        &self.binomial
    }
}

pub fn lookup_tables() -> &'static LookupTables {
    &LOOKUP_TABLES
}

/// Number of ways `primaries` triggers can grow into `fired` cells.
fn chain_binomial(fired: usize, primaries: usize) -> f64 {
    match (fired, primaries) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        (n, j) if j > n => 0.0,
        (n, j) => binomial_coefficient(n - 1, j - 1),
    }
}

fn binomial_coefficient(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    let mut value = 1.0;
    for step in 0..k {
        value = value * (n - step) as f64 / (step + 1) as f64;
    }
    value
}
