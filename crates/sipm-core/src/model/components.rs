use super::afterpulse::AfterpulseSplit;
use super::crosstalk::crosstalk_mixture;
use super::spectrum::SpectrumParameters;
use crate::common::TRUNCATION_ORDER;
use crate::numerics::{normal_pdf, normal_pdf_into, poisson_weights};
use faer::Mat;

/// Number of photo-electron peaks drawn, counts `1..TRUNCATION_ORDER`.
pub const PEAK_COUNT: usize = TRUNCATION_ORDER - 1;

/// Position and width of the two Gaussians drawn for one fired-cell count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakShape {
    pub count: usize,
    pub primary_mean: f64,
    pub afterpulse_mean: f64,
    pub sigma: f64,
}

impl PeakShape {
    /// The afterpulse peak shares the primary width; only its position moves
    /// towards the pedestal by the fraction `dap`.
    pub fn for_count(count: usize, params: &SpectrumParameters) -> Self {
        let k = count as f64;
        let sigma = (k * params.spe_sigma * params.spe_sigma
            + params.eped_sigma * params.eped_sigma)
            .sqrt();
        Self {
            count,
            primary_mean: params.eped + k * params.spe,
            afterpulse_mean: params.eped + k * params.spe * (1.0 - params.dap),
            sigma,
        }
    }
}

/// Zero photo-electron peak: `norm * e^-lambda * N(x; eped, eped_sigma)`.
pub fn pedestal_signal(x: &[f64], norm: f64, eped: f64, eped_sigma: f64, lambda: f64) -> Vec<f64> {
    let mut signal = vec![0.0; x.len()];
    normal_pdf_into(x, eped, eped_sigma, norm * (-lambda).exp(), &mut signal);
    signal
}

/// Per-count weights: Poisson, then crosstalk, then the afterpulse split.
pub fn peak_weights(lambda: f64, opct: f64, pap: f64) -> AfterpulseSplit {
    let observed = crosstalk_mixture(&poisson_weights(lambda), opct);
    AfterpulseSplit::split(&observed, pap)
}

/// Photo-electron peaks summed over counts `1..TRUNCATION_ORDER`.
pub fn photoelectron_signal(x: &[f64], params: &SpectrumParameters) -> Vec<f64> {
    sum_over_counts(&photoelectron_peaks(x, params))
}

/// Photo-electron contribution of every count as a `PEAK_COUNT x x.len()`
/// matrix; row `k - 1` holds count `k`, the primary and the single
/// afterpulse Gaussian together.
pub fn photoelectron_peaks(x: &[f64], params: &SpectrumParameters) -> Mat<f64> {
    let weights = peak_weights(params.lambda, params.opct, params.pap);
    let shapes: Vec<PeakShape> = (1..TRUNCATION_ORDER)
        .map(|count| PeakShape::for_count(count, params))
        .collect();

    Mat::from_fn(PEAK_COUNT, x.len(), |row, col| {
        let shape = &shapes[row];
        let primary = weights.no_afterpulse[shape.count]
            * normal_pdf(x[col], shape.primary_mean, shape.sigma);
        let afterpulse = weights.single_afterpulse[shape.count]
            * normal_pdf(x[col], shape.afterpulse_mean, shape.sigma);
        params.norm * (primary + afterpulse)
    })
}

/// Sum a count-by-observation matrix along the count axis.
pub fn sum_over_counts(peaks: &Mat<f64>) -> Vec<f64> {
    let ones = Mat::<f64>::full(1, peaks.nrows(), 1.0);
    let total = &ones * peaks;
    (0..total.ncols()).map(|col| total[(0, col)]).collect()
}
