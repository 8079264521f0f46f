pub mod integration;
pub mod normal;
pub mod poisson;
pub mod tables;

pub use integration::{IntegrationError, integrate_trapezoid};
pub use normal::{normal_pdf, normal_pdf_into};
pub use poisson::{poisson_weights, truncation_tail_mass};
pub use tables::{CountMatrix, CountWeights, LookupTables, lookup_tables};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// `count` evenly spaced points from `start` to `end`, both included.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 {
        return None;
    }

    let step = (end - start) / ((count - 1) as f64);
    let mut grid: Vec<f64> = (0..count)
        .map(|index| start + step * (index as f64))
        .collect();

    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

pub fn within_tolerance(lhs: f64, rhs: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let abs_diff = (lhs - rhs).abs();
    let scale = lhs.abs().max(rhs.abs());
    abs_diff <= abs_tol || abs_diff <= rel_tol * scale
}
